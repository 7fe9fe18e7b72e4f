//! Per-category extractors.
//!
//! Each extractor is a function from fetched content to a result fragment.
//! The page-scanning ones (`social`, `contact`, `links`) take the sorted
//! cache snapshot so their output is deterministic regardless of fetch
//! completion order; the page-seeking ones (`policy`, `faq`, `brand`) drive
//! the cache themselves.

pub mod brand;
pub mod contact;
pub mod faq;
pub mod hero;
pub mod links;
pub mod policy;
pub mod social;

pub use brand::{extract_brand_context, extract_brand_name, extract_store_metadata, StoreMetadata};
pub use contact::extract_contact_info;
pub use faq::extract_faqs;
pub use hero::extract_hero_products;
pub use links::extract_important_links;
pub use policy::extract_policies;
pub use social::extract_social_handles;
