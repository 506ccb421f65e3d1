// src/api/common.rs
// Shared request/response shapes for list endpoints

use serde::{Deserialize, Serialize};

use crate::config::EcoConfig;

/// `?limit=&offset=` query parameters accepted by every list endpoint.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Resolved page window passed down to the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    pub fn resolve(&self, config: &EcoConfig) -> Page {
        Page {
            limit: i64::from(config.clamp_limit(self.limit)),
            offset: i64::from(self.offset.unwrap_or(0)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
