//! Gateway-owned order store.
//!
//! Persists all orders in `orders.json` under the configured state
//! path. In-memory map guarded by a `parking_lot::RwLock`; every
//! mutation rewrites the file atomically (tmp + rename) so a crash
//! never leaves a half-written store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use ad_domain::error::{Error, Result};
use ad_domain::order::{Order, OrderStatus};

pub struct OrderStore {
    orders_path: PathBuf,
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl OrderStore {
    /// Load or create the store at `state_path/orders.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_path).map_err(Error::Io)?;
        let orders_path = state_path.join("orders.json");

        let orders: HashMap<Uuid, Order> = if orders_path.exists() {
            let raw = std::fs::read_to_string(&orders_path).map_err(Error::Io)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            HashMap::new()
        };

        tracing::info!(
            orders = orders.len(),
            path = %orders_path.display(),
            "order store loaded"
        );

        Ok(Self {
            orders_path,
            orders: RwLock::new(orders),
        })
    }

    pub fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write();
        orders.insert(order.id, order);
        Self::write_file(&self.orders_path, &orders)
    }

    pub fn get(&self, id: &Uuid) -> Option<Order> {
        self.orders.read().get(id).cloned()
    }

    /// Apply `f` to a copy of the order; the original is replaced (and
    /// persisted) only when `f` succeeds, so a failed operation leaves
    /// no trace.
    pub fn update<T>(&self, id: &Uuid, f: impl FnOnce(&mut Order) -> Result<T>) -> Result<T> {
        let mut orders = self.orders.write();
        let current = orders
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("order {id}")))?;

        let mut candidate = current.clone();
        let out = f(&mut candidate)?;
        candidate.updated_at = Utc::now();
        orders.insert(*id, candidate);
        Self::write_file(&self.orders_path, &orders)?;
        Ok(out)
    }

    /// Most-recent-first listing with an optional status filter.
    pub fn list(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
        offset: usize,
    ) -> (Vec<Order>, usize) {
        let orders = self.orders.read();
        let mut matching: Vec<&Order> = orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        (items, total)
    }

    /// Orders stuck in `processing` for longer than `ceiling`: a crash
    /// or lost background task; operators retrigger these.
    pub fn stale_processing(&self, ceiling: chrono::Duration) -> Vec<Order> {
        let threshold = Utc::now() - ceiling;
        let orders = self.orders.read();
        let mut stale: Vec<Order> = orders
            .values()
            .filter(|o| o.status == OrderStatus::Processing && o.updated_at < threshold)
            .cloned()
            .collect();
        stale.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        stale
    }

    fn write_file(path: &Path, orders: &HashMap<Uuid, Order>) -> Result<()> {
        let json = serde_json::to_string_pretty(orders)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(Error::Io)?;
        std::fs::rename(&tmp, path).map_err(Error::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_domain::birth::BirthFacts;
    use ad_domain::conversation::RequestKind;

    fn order() -> Order {
        let facts = BirthFacts {
            name: "Asha Rao".into(),
            date_of_birth: "1991-04-23".into(),
            time_of_birth: "06:45".into(),
            place_of_birth: "Bengaluru, India".into(),
            latitude: None,
            longitude: None,
            goals: vec![],
        };
        Order::new(
            facts,
            RequestKind::FullReport,
            "asha@example.com".into(),
            49_900,
            "INR".into(),
        )
    }

    #[test]
    fn orders_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let o = order();
        let id = o.id;
        {
            let store = OrderStore::new(dir.path()).unwrap();
            store.insert(o).unwrap();
        }
        let store = OrderStore::new(dir.path()).unwrap();
        assert_eq!(store.get(&id).unwrap().email, "asha@example.com");
    }

    #[test]
    fn failed_update_leaves_order_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path()).unwrap();
        let o = order();
        let id = o.id;
        store.insert(o).unwrap();

        let result: Result<()> = store.update(&id, |o| {
            o.error_reason = Some("half-applied".into());
            Err(Error::Validation("abort".into()))
        });
        assert!(result.is_err());
        assert!(store.get(&id).unwrap().error_reason.is_none());
    }

    #[test]
    fn list_filters_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path()).unwrap();
        let mut a = order();
        a.transition(OrderStatus::Processing, "confirm payment").unwrap();
        store.insert(a).unwrap();
        store.insert(order()).unwrap();

        let (processing, total) = store.list(Some(OrderStatus::Processing), 10, 0);
        assert_eq!(total, 1);
        assert_eq!(processing[0].status, OrderStatus::Processing);
        let (all, total_all) = store.list(None, 10, 0);
        assert_eq!(total_all, 2);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn stale_processing_respects_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderStore::new(dir.path()).unwrap();
        let mut o = order();
        o.transition(OrderStatus::Processing, "confirm payment").unwrap();
        o.updated_at = Utc::now() - chrono::Duration::minutes(45);
        let id = o.id;
        store.insert(o).unwrap();

        let stale = store.stale_processing(chrono::Duration::minutes(30));
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, id);
        assert!(store.stale_processing(chrono::Duration::minutes(60)).is_empty());
    }
}
