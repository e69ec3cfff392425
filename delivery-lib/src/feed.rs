//! New-order detection by polling the order list.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::DeliveryClient;
use crate::error::Error;
use crate::model::Order;

const FEED_CHANNEL_CAPACITY: usize = 32;

/// Anything that can list the current orders.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<Order>, Error>;
}

#[async_trait]
impl OrderSource for DeliveryClient {
    async fn fetch_orders(&self) -> Result<Vec<Order>, Error> {
        self.resource::<Order>().list().await
    }
}

#[async_trait]
impl<T: OrderSource + ?Sized> OrderSource for Arc<T> {
    async fn fetch_orders(&self) -> Result<Vec<Order>, Error> {
        (**self).fetch_orders().await
    }
}

/// A newly detected order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderNotification {
    pub order_id: i64,
    pub customer_name: String,
    /// What was ordered (`2 x Pizza Hawaiana`).
    pub items: String,
    pub address: String,
    /// When the order was detected.
    pub timestamp: DateTime<Utc>,
}

impl NewOrderNotification {
    pub fn from_order(order: &Order) -> Option<Self> {
        Some(Self {
            order_id: order.id?,
            customer_name: order
                .customer_name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Customer #{}", order.customer_id)),
            items: order.items(),
            address: order.street().unwrap_or_default().to_string(),
            timestamp: Utc::now(),
        })
    }
}

/// Monotonic "last seen" order id.
///
/// The first observation only primes the cursor; orders that already exist
/// are never reported.
#[derive(Debug, Clone, Default)]
pub struct OrderCursor {
    last_seen: Option<i64>,
    primed: bool,
}

impl OrderCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts after `id`, already primed.
    pub fn starting_after(id: i64) -> Self {
        Self {
            last_seen: Some(id),
            primed: true,
        }
    }

    pub fn last_seen(&self) -> Option<i64> {
        self.last_seen
    }

    /// Returns the orders newer than the cursor in ascending id order and
    /// advances the cursor past them. Orders without an id are ignored.
    pub fn observe(&mut self, orders: Vec<Order>) -> Vec<Order> {
        let max_id = orders.iter().filter_map(|o| o.id).max();

        if !self.primed {
            self.primed = true;
            self.last_seen = max_id;
            return Vec::new();
        }

        let mut fresh: Vec<Order> = orders
            .into_iter()
            .filter(|o| match (o.id, self.last_seen) {
                (Some(id), Some(last)) => id > last,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .collect();
        fresh.sort_by_key(|o| o.id);

        if let Some(newest) = fresh.last().and_then(|o| o.id) {
            self.last_seen = Some(newest);
        }
        fresh
    }
}

/// Background poll loop publishing [`NewOrderNotification`]s.
///
/// # Example
///
/// ```ignore
/// let cancel = CancellationToken::new();
/// let feed = OrderFeed::spawn(client.clone(), Duration::from_secs(30), cancel.clone());
/// let mut orders = feed.subscribe();
/// while let Ok(order) = orders.recv().await {
///     println!("New order #{} from {}", order.order_id, order.customer_name);
/// }
/// ```
#[derive(Debug)]
pub struct OrderFeed {
    tx: broadcast::Sender<NewOrderNotification>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl OrderFeed {
    /// Starts polling `source` every `interval` until `cancel` fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        source: impl OrderSource + 'static,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        let handle = tokio::spawn(poll_loop(
            source,
            interval.max(Duration::from_millis(1)),
            tx.clone(),
            cancel.clone(),
        ));
        Self { tx, cancel, handle }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NewOrderNotification> {
        self.tx.subscribe()
    }

    /// Stops polling and waits for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            log::warn!("Order feed task failed: {}", e);
        }
    }
}

async fn poll_loop(
    source: impl OrderSource,
    period: Duration,
    tx: broadcast::Sender<NewOrderNotification>,
    cancel: CancellationToken,
) {
    let mut cursor = OrderCursor::new();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    log::debug!("Order feed started, polling every {:?}", period);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let orders = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.fetch_orders() => result,
        };

        let orders = match orders {
            Ok(orders) => orders,
            Err(e) => {
                log::warn!("Polling orders failed: {}", e.message());
                continue;
            }
        };

        for order in cursor.observe(orders) {
            if let Some(notification) = NewOrderNotification::from_order(&order) {
                log::info!(
                    "New order #{} from {}",
                    notification.order_id,
                    notification.customer_name
                );
                let _ = tx.send(notification);
            }
        }
    }
    log::debug!("Order feed stopped");
}
