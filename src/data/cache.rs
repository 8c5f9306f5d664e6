use super::series::PriceSeries;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Loaded price series keyed by symbol, shared across readers.
pub struct SeriesCache {
    data: Mutex<HashMap<String, Arc<PriceSeries>>>,
    capacity: usize,
}

impl SeriesCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn get(&self, symbol: &str) -> Option<Arc<PriceSeries>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(symbol).cloned()
    }

    pub fn set(&self, symbol: String, series: Arc<PriceSeries>) {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        if data.len() >= self.capacity && !data.contains_key(&symbol) {
            // Clear when full
            data.clear();
        }
        data.insert(symbol, series);
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
