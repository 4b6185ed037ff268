//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod advance;
pub mod care_of;
pub mod floor;
pub mod notification;
pub mod payment;
pub mod property;
pub mod system_state;
pub mod user;

// Re-export specific types to avoid conflicts
pub use advance::{Column as AdvanceColumn, Entity as Advance, Model as AdvanceModel};
pub use care_of::{Column as CareOfColumn, Entity as CareOf, Model as CareOfModel};
pub use floor::{Column as FloorColumn, Entity as Floor, Model as FloorModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use property::{Column as PropertyColumn, Entity as Property, Model as PropertyModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
