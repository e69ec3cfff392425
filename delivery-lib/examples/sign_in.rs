//! Email/password sign-in example.
//!
//! Run with: cargo run --example sign_in
//!
//! Requires .env file with:
//! - DELIVERY_IDENTITY_API_KEY
//! - DELIVERY_EMAIL
//! - DELIVERY_PASSWORD
//! - DELIVERY_API_URL (optional, defaults to http://localhost:5000)

use std::env;

use delivery_lib::DeliveryClient;
use delivery_lib::auth::AutoRefreshTokenProvider;
use delivery_lib::auth::IdentityPasswordFlow;
use delivery_lib::config::DeliveryConfig;
use delivery_lib::model::Order;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let config = DeliveryConfig::from_env()?;
    let api_key = config
        .identity_api_key
        .clone()
        .expect("DELIVERY_IDENTITY_API_KEY not set");
    let email = env::var("DELIVERY_EMAIL").expect("DELIVERY_EMAIL not set");
    let password = env::var("DELIVERY_PASSWORD").expect("DELIVERY_PASSWORD not set");

    let flow = IdentityPasswordFlow::new(api_key, email, password);

    println!("Signing in...\n");

    let profile = flow.sign_in().await?;
    println!("Signed in as {}", profile.uid);
    println!("Display name: {:?}", profile.display_name);
    println!("Token: {}", profile.token.redacted());

    let client = DeliveryClient::from_config(&config, AutoRefreshTokenProvider::new(flow))?;
    let orders = client.resource::<Order>().list().await?;
    println!("\n{} orders on {}", orders.len(), client.base_url());

    Ok(())
}
