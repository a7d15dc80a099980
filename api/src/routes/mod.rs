pub mod ask;
pub mod document;
pub mod page_route;
pub mod session;
