use futures::try_join;
use url::Url;

use crate::DeliveryClient;
use crate::error::Error;
use crate::model::Record;

/// Every series the dashboard shows, fetched together.
#[derive(Debug, Clone, Default)]
pub struct DashboardOverview {
    pub sales: Vec<Record>,
    pub orders: Vec<Record>,
    pub product_categories: Vec<Record>,
    pub motorcycles: Vec<Record>,
    pub motorcycle_states: Vec<Record>,
}

/// Pre-aggregated series served by the statistics server.
///
/// Every endpoint returns a loosely shaped JSON array, kept as [`Record`]s
/// for the helpers in [`crate::stats`].
#[derive(Debug, Clone)]
pub struct DashboardService {
    client: DeliveryClient,
}

impl DashboardService {
    pub(crate) fn new(client: DeliveryClient) -> Self {
        Self { client }
    }

    pub async fn sales(&self) -> Result<Vec<Record>, Error> {
        self.fetch("sales").await
    }

    pub async fn orders(&self) -> Result<Vec<Record>, Error> {
        self.fetch("orders").await
    }

    /// Order counts per hour for `date` (`YYYY-MM-DD`).
    pub async fn orders_by_hour(&self, date: &str) -> Result<Vec<Record>, Error> {
        let mut url: Url = self.client.stats_endpoint("orders_by_hour")?;
        url.query_pairs_mut().append_pair("date", date);
        self.client.get_json(url).await
    }

    pub async fn product_categories(&self) -> Result<Vec<Record>, Error> {
        self.fetch("product_categories").await
    }

    pub async fn motorcycles(&self) -> Result<Vec<Record>, Error> {
        self.fetch("motorcycles").await
    }

    pub async fn motorcycle_states(&self) -> Result<Vec<Record>, Error> {
        self.fetch("motorcycle_states").await
    }

    /// Fetches all date-independent series concurrently; the first failure
    /// fails the whole overview.
    pub async fn overview(&self) -> Result<DashboardOverview, Error> {
        let (sales, orders, product_categories, motorcycles, motorcycle_states) = try_join!(
            self.sales(),
            self.orders(),
            self.product_categories(),
            self.motorcycles(),
            self.motorcycle_states(),
        )?;
        Ok(DashboardOverview {
            sales,
            orders,
            product_categories,
            motorcycles,
            motorcycle_states,
        })
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Record>, Error> {
        let url = self.client.stats_endpoint(path)?;
        self.client.get_json(url).await
    }
}
