//! Query parameter validation.

use crate::catalog::{SearchParams, SortMode};
use crate::config::Config;
use crate::error::GateError;
use crate::models::SearchQuery;

/// Accepted ranges for search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamBounds {
    pub max_search_length: usize,
    pub max_page_size: u32,
    pub default_page_size: u32,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ParamBounds {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_search_length: config.max_search_length,
            max_page_size: config.max_page_size.max(1),
            default_page_size: config.default_page_size.clamp(1, config.max_page_size.max(1)),
        }
    }

    /// Parses and validates a raw query. The first violation wins, checked in
    /// the order search, sort, limit, offset.
    pub fn validate(&self, query: &SearchQuery) -> Result<SearchParams, GateError> {
        let search = query.search.as_deref().unwrap_or("").trim();
        let search_len = search.chars().count();
        if search_len > self.max_search_length {
            return Err(GateError::invalid(
                "search",
                format!(
                    "must be at most {} characters, got {}",
                    self.max_search_length, search_len
                ),
            ));
        }

        let sort = match present(&query.sort) {
            None => SortMode::default(),
            Some(token) => SortMode::from_token(token).ok_or_else(|| {
                let known: Vec<&str> = SortMode::ALL.iter().map(|m| m.token()).collect();
                GateError::invalid(
                    "sort",
                    format!("unknown sort option '{}', expected one of {}", token, known.join(", ")),
                )
            })?,
        };

        let limit = match present(&query.limit) {
            None => self.default_page_size as i64,
            Some(raw) => parse_integer("limit", raw)?,
        };
        if limit < 1 || limit > self.max_page_size as i64 {
            return Err(GateError::invalid(
                "limit",
                format!("must be between 1 and {}, got {}", self.max_page_size, limit),
            ));
        }

        let offset = match present(&query.offset) {
            None => 0,
            Some(raw) => parse_integer("offset", raw)?,
        };
        if offset < 0 {
            return Err(GateError::invalid(
                "offset",
                format!("must be zero or greater, got {}", offset),
            ));
        }
        let offset = u32::try_from(offset)
            .map_err(|_| GateError::invalid("offset", format!("must be at most {}", u32::MAX)))?;

        Ok(SearchParams::new(search, sort, limit as u32, offset))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, GateError> {
    raw.parse::<i64>()
        .map_err(|_| GateError::invalid(field, format!("'{}' is not an integer", raw)))
}
