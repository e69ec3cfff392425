//! Command implementations.

use std::time::Duration;

use delivery_lib::DeliveryClient;
use delivery_lib::assistant::Assistant;
use delivery_lib::assistant::DEFAULT_ASSISTANT_URL;
use delivery_lib::assistant::TextGenerationSource;
use delivery_lib::config::DeliveryConfig;
use delivery_lib::feed::OrderFeed;
use delivery_lib::model::Address;
use delivery_lib::model::Customer;
use delivery_lib::model::Driver;
use delivery_lib::model::Issue;
use delivery_lib::model::Menu;
use delivery_lib::model::Motorcycle;
use delivery_lib::model::Order;
use delivery_lib::model::Photo;
use delivery_lib::model::Product;
use delivery_lib::model::Resource;
use delivery_lib::model::Restaurant;
use delivery_lib::model::Shift;
use delivery_lib::notify::Notifier;
use delivery_lib::stats;
use delivery_lib::table::Column;
use delivery_lib::table::TableRow;
use delivery_lib::table::TableView;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::cli::ResourceKind;
use crate::cli::StatsSeries;
use crate::error::CliError;
use crate::render;

/// Shared state for every command.
pub struct Context {
    pub client: DeliveryClient,
    pub config: DeliveryConfig,
    pub notifier: Notifier,
    pub cancel: CancellationToken,
}

/// Options of `list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub sort: Vec<String>,
    pub page: usize,
    pub page_size: Option<usize>,
}

/// A resource the CLI can show as a table.
trait Listing: Resource + TableRow {
    fn columns() -> Vec<Column>;
}

macro_rules! columns {
    ($($field:literal => $header:literal),* $(,)?) => {
        vec![$(Column::new($field, $header)),*]
    };
}

impl Listing for Restaurant {
    fn columns() -> Vec<Column> {
        columns!["id" => "ID", "name" => "Name", "address" => "Address", "phone" => "Phone", "email" => "Email"]
    }
}

impl Listing for Product {
    fn columns() -> Vec<Column> {
        columns!["id" => "ID", "name" => "Name", "category" => "Category", "price" => "Price"]
    }
}

impl Listing for Menu {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "restaurant.name" => "Restaurant",
            "product.name" => "Product",
            "price" => "Price",
            "availability" => "Available",
        ]
    }
}

impl Listing for Customer {
    fn columns() -> Vec<Column> {
        columns!["id" => "ID", "name" => "Name", "email" => "Email", "phone" => "Phone"]
    }
}

impl Listing for Order {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "customer.name" => "Customer",
            "menu.product.name" => "Product",
            "quantity" => "Qty",
            "total_price" => "Total",
            "status" => "Status",
            "created_at" => "Created",
        ]
    }
}

impl Listing for Address {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "order_id" => "Order",
            "street" => "Street",
            "city" => "City",
            "postal_code" => "Postal code",
        ]
    }
}

impl Listing for Driver {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "name" => "Name",
            "license_number" => "License",
            "phone" => "Phone",
            "status" => "Status",
        ]
    }
}

impl Listing for Motorcycle {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "license_plate" => "Plate",
            "brand" => "Brand",
            "year" => "Year",
            "status" => "Status",
        ]
    }
}

impl Listing for Shift {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "driver_id" => "Driver",
            "motorcycle_id" => "Motorcycle",
            "start_time" => "Start",
            "end_time" => "End",
            "status" => "Status",
        ]
    }
}

impl Listing for Issue {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "motorcycle_id" => "Motorcycle",
            "issue_type" => "Type",
            "description" => "Description",
            "date_reported" => "Reported",
            "status" => "Status",
        ]
    }
}

impl Listing for Photo {
    fn columns() -> Vec<Column> {
        columns![
            "id" => "ID",
            "issue_id" => "Issue",
            "caption" => "Caption",
            "image_url" => "Image",
            "taken_at" => "Taken",
        ]
    }
}

/// Runs `$body` with `$ty` bound to the model type of `$kind`.
macro_rules! with_resource {
    ($kind:expr, $ty:ident => $body:expr) => {
        match $kind {
            ResourceKind::Restaurants => { type $ty = Restaurant; $body }
            ResourceKind::Products => { type $ty = Product; $body }
            ResourceKind::Menus => { type $ty = Menu; $body }
            ResourceKind::Customers => { type $ty = Customer; $body }
            ResourceKind::Orders => { type $ty = Order; $body }
            ResourceKind::Addresses => { type $ty = Address; $body }
            ResourceKind::Drivers => { type $ty = Driver; $body }
            ResourceKind::Motorcycles => { type $ty = Motorcycle; $body }
            ResourceKind::Shifts => { type $ty = Shift; $body }
            ResourceKind::Issues => { type $ty = Issue; $body }
            ResourceKind::Photos => { type $ty = Photo; $body }
        }
    };
}

pub async fn list(ctx: &Context, kind: ResourceKind, options: ListOptions) -> Result<(), CliError> {
    with_resource!(kind, R => list_resource::<R>(ctx, options).await)
}

pub async fn get(ctx: &Context, kind: ResourceKind, id: i64) -> Result<(), CliError> {
    let json = match kind {
        ResourceKind::Photos => serde_json::to_string_pretty(&ctx.client.photos().get(id).await?)?,
        _ => with_resource!(kind, R => {
            let record = {
                let _loading = ctx.notifier.loader().guard();
                ctx.client.resource::<R>().get(id).await?
            };
            serde_json::to_string_pretty(&record)?
        }),
    };
    println!("{}", json);
    Ok(())
}

pub async fn delete(ctx: &Context, kind: ResourceKind, id: i64, yes: bool) -> Result<(), CliError> {
    with_resource!(kind, R => delete_resource::<R>(ctx, id, yes).await)
}

async fn list_resource<R: Listing>(ctx: &Context, options: ListOptions) -> Result<(), CliError> {
    let rows = {
        let _loading = ctx.notifier.loader().guard();
        ctx.client.resource::<R>().list().await?
    };

    let view = build_view(rows, R::columns(), ctx.config.page_size, &options)?;
    print!("{}", render::table(&view));
    Ok(())
}

/// Applies search, sort toggles and page selection in that order.
fn build_view<R: TableRow>(
    rows: Vec<R>,
    columns: Vec<Column>,
    default_page_size: usize,
    options: &ListOptions,
) -> Result<TableView<R>, CliError> {
    let mut view = TableView::new(rows, columns)
        .with_page_size(options.page_size.unwrap_or(default_page_size));

    if let Some(term) = &options.search {
        view.set_search_term(term.as_str());
    }
    for field in &options.sort {
        if !view.columns().iter().any(|c| &c.field == field && c.sortable) {
            log::warn!("Ignoring sort on unknown column {}", field);
        }
        view.sort_by(field);
    }
    if options.page > 1 && !view.go_to_page(options.page) {
        return Err(CliError::PageOutOfRange {
            page: options.page,
            total: view.total_pages(),
        });
    }
    Ok(view)
}

async fn delete_resource<R: Resource>(ctx: &Context, id: i64, yes: bool) -> Result<(), CliError> {
    let confirmed = yes
        || ctx
            .notifier
            .confirm(
                format!("Delete {}", R::NAME),
                format!("Delete {} #{}? This cannot be undone.", R::NAME, id),
            )
            .await;
    if !confirmed {
        ctx.notifier.info("Nothing deleted");
        return Ok(());
    }

    let response = ctx.client.resource::<R>().delete(id).await?;
    let message = if response.message.is_empty() {
        format!("Deleted {} #{}", R::NAME, id)
    } else {
        response.message
    };
    ctx.notifier.success(message);
    Ok(())
}

pub async fn watch_orders(ctx: &Context, interval: Option<u64>) -> Result<(), CliError> {
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(ctx.config.poll_interval);
    let feed = OrderFeed::spawn(ctx.client.clone(), interval, ctx.cancel.child_token());
    let mut orders = feed.subscribe();

    ctx.notifier
        .info(format!("Watching for new orders every {:?}, Ctrl-C to stop", interval));

    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            received = orders.recv() => match received {
                Ok(order) => {
                    let address = if order.address.is_empty() {
                        String::new()
                    } else {
                        format!(" to {}", order.address)
                    };
                    ctx.notifier.info(format!(
                        "New order #{} from {}: {}{}",
                        order.order_id, order.customer_name, order.items, address
                    ));
                }
                Err(RecvError::Lagged(missed)) => {
                    ctx.notifier.warning(format!("Missed {} new orders", missed));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    feed.shutdown().await;
    Ok(())
}

pub async fn stats(ctx: &Context, series: StatsSeries) -> Result<(), CliError> {
    let dashboard = ctx.client.dashboard();
    let _loading = ctx.notifier.loader().guard();

    let output = match series {
        StatsSeries::Sales => {
            let days = stats::group_sales_by_date(&dashboard.sales().await?);
            render_all(days, columns!["date" => "Date", "total" => "Total", "orders_count" => "Orders"])
        }
        StatsSeries::Orders => {
            let days = stats::group_orders_by_day(&dashboard.orders().await?);
            render_all(days, columns!["date" => "Date", "orders_count" => "Orders", "total" => "Revenue"])
        }
        StatsSeries::Hours { date } => {
            let hours = stats::format_orders_by_hour(&dashboard.orders_by_hour(&date).await?);
            render_all(hours, columns!["hour" => "Hour", "count" => "Orders"])
        }
        StatsSeries::Motorcycles => {
            let states = stats::last_state_per_motorcycle(&dashboard.motorcycle_states().await?);
            render_all(
                states,
                columns![
                    "motorcycle_id" => "Motorcycle",
                    "state" => "State",
                    "timestamp" => "Since",
                ],
            )
        }
    };
    print!("{}", output);
    Ok(())
}

pub async fn ask(ctx: &Context, question: &str, faq: Option<usize>) -> Result<(), CliError> {
    let mut source = TextGenerationSource::new(
        ctx.config
            .assistant_url
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_URL),
    );
    if let Some(key) = &ctx.config.assistant_api_key {
        source = source.with_api_key(key.clone());
    }
    let mut assistant = Assistant::new(source);
    let total = assistant.faqs().len();

    let reply = match faq {
        Some(number) => number
            .checked_sub(1)
            .and_then(|index| assistant.choose_faq(index))
            .ok_or(CliError::UnknownFaq { number, total })?,
        None if question.trim().is_empty() => {
            for (i, faq) in assistant.faqs().iter().enumerate() {
                println!("{}. {}", i + 1, faq.question);
            }
            return Ok(());
        }
        None => {
            let _loading = ctx.notifier.loader().guard();
            assistant.send(question).await.unwrap_or_default()
        }
    };
    println!("{}", reply);
    Ok(())
}

/// One page holding every row.
fn render_all<R: TableRow>(rows: Vec<R>, columns: Vec<Column>) -> String {
    let page_size = rows.len().max(1);
    render::table(&TableView::new(rows, columns).with_page_size(page_size))
}

#[cfg(test)]
mod tests {
    use delivery_lib::model::Record;
    use pretty_assertions::assert_eq;

    use super::*;

    fn rows() -> Vec<Record> {
        (1..=25)
            .map(|i| Record::new().set("id", i as i64).set("name", format!("item {}", i)))
            .collect()
    }

    fn names(view: &TableView<Record>) -> Vec<String> {
        view.visible_rows()
            .iter()
            .filter_map(|r| r.get_str("name").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_build_view_applies_options() {
        let options = ListOptions {
            search: Some("item 1".into()),
            sort: vec!["id".into(), "id".into()],
            page: 2,
            page_size: Some(5),
        };
        let view = build_view(rows(), columns!["id" => "ID", "name" => "Name"], 10, &options).unwrap();

        // item 1, item 10..=19 match; descending by id
        assert_eq!(view.filtered_len(), 11);
        assert_eq!(view.current_page(), 2);
        assert_eq!(
            names(&view),
            vec!["item 14", "item 13", "item 12", "item 11", "item 10"]
        );
    }

    #[test]
    fn test_build_view_rejects_missing_page() {
        let options = ListOptions {
            page: 4,
            ..Default::default()
        };
        let err = build_view(rows(), columns!["id" => "ID"], 10, &options).unwrap_err();
        assert!(matches!(err, CliError::PageOutOfRange { page: 4, total: 3 }));
    }

    #[test]
    fn test_every_listing_has_an_id_column() {
        with_resource!(ResourceKind::Orders, R => assert_eq!(R::columns()[0].field, "id"));
        assert_eq!(Photo::columns().len(), 5);
    }
}
