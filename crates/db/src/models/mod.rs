pub mod activity;
pub mod document;
pub mod family;
pub mod gallery_image;
pub mod menu_item;
pub mod message;
pub mod program;
pub mod resource;
pub mod site_settings;
pub mod staff_member;
pub mod transportation_route;

pub use resource::Resource;
