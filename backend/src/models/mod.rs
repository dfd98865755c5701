use serde::{Deserialize, Serialize};

/// Declares an enum persisted as a lowercase text column.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod availability;
pub mod lookup;
pub mod owner;
pub mod property;
pub mod reservation;
pub mod user;

pub use availability::*;
pub use lookup::*;
pub use owner::*;
pub use property::*;
pub use reservation::*;
pub use user::*;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    /// Returns (page, per_page), both clamped into range.
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }

    pub fn offset(&self) -> i64 {
        let (page, per_page) = self.resolve();
        (page - 1) * per_page
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: &PageParams, total: i64) -> Self {
        let (page, per_page) = params.resolve();
        Self {
            items,
            page,
            per_page,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

/// Trims and drops empty strings.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn require_text(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn require_email(value: &str) -> Result<String, String> {
    let email = require_text("email", value)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(format!("'{}' is not a valid email address", value.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_clamp() {
        let params = PageParams {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(params.resolve(), (1, MAX_PER_PAGE));
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(params.resolve(), (3, DEFAULT_PER_PAGE));
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn page_counts_partial_last_page() {
        let params = PageParams {
            page: None,
            per_page: Some(10),
        };
        let page = Page::new(vec![1, 2, 3], &params, 21);
        assert_eq!(page.total_pages, 3);
        let empty: Page<i32> = Page::new(vec![], &params, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn email_validation() {
        assert_eq!(require_email(" Jane@Example.com ").unwrap(), "jane@example.com");
        assert!(require_email("jane").is_err());
        assert!(require_email("@example.com").is_err());
        assert!(require_email("jane@localhost").is_err());
    }

    #[test]
    fn optional_text_is_trimmed() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(clean_optional(None), None);
    }
}
