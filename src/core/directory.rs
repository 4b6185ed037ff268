//! Tenancy directory - property/floor bookkeeping and authorization reads.
//!
//! The three guard queries (`is_manager`, `is_tenant`, `floor_occupied`)
//! are pure reads over the care-of and floor relations; every mutating
//! operation in the crate calls one of them before touching anything.
//! The rest of the module is the property and floor plumbing around them.

use crate::{
    entities::{CareOf, Floor, Property, User, care_of, floor, property, user},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// A floor as shown in a property listing, with tenant and pending state.
#[derive(Debug, Clone)]
pub struct FloorOverview {
    /// The floor row itself
    pub floor: floor::Model,
    /// Display name of the current tenant, None while vacant
    pub tenant_name: Option<String>,
    /// Whether a non-advance request is pending on this floor
    pub has_pending_request: bool,
    /// Whether an advance payment is pending on this floor
    pub has_pending_advance: bool,
}

/// Returns whether `user_id` manages `property_id` via the care-of relation.
pub async fn is_manager<C>(db: &C, user_id: i64, property_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = CareOf::find()
        .filter(care_of::Column::Uid.eq(user_id))
        .filter(care_of::Column::Pid.eq(property_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Returns whether `user_id` is the current tenant of `floor_id`.
pub async fn is_tenant<C>(db: &C, user_id: i64, floor_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Tenant.eq(user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Returns whether `floor_id` currently has a tenant. A missing floor
/// counts as unoccupied.
pub async fn floor_occupied<C>(db: &C, floor_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Tenant.is_not_null())
        .count(db)
        .await?;
    Ok(count > 0)
}

/// The first manager on record for a property, used as the counterpart
/// for tenant-originated notifications.
pub async fn first_manager<C>(db: &C, property_id: i64) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    let link = CareOf::find()
        .filter(care_of::Column::Pid.eq(property_id))
        .order_by_asc(care_of::Column::Id)
        .one(db)
        .await?;
    Ok(link.map(|l| l.uid))
}

/// Registers a new property and links the creator as its first manager.
/// Both inserts run in one transaction.
pub async fn create_property(
    db: &DatabaseConnection,
    owner_id: i64,
    name: String,
    address: String,
    photo: Option<String>,
) -> Result<property::Model> {
    if name.trim().is_empty() {
        return Err(Error::MissingField {
            field: "property name",
        });
    }

    let txn = db.begin().await?;

    let created = property::ActiveModel {
        name: Set(name.trim().to_string()),
        address: Set(address),
        photo: Set(photo),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    care_of::ActiveModel {
        uid: Set(owner_id),
        pid: Set(created.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(created)
}

/// Adds a floor to a property. Only managers of the property may do this.
pub async fn add_floor(
    db: &DatabaseConnection,
    manager_id: i64,
    property_id: i64,
    name: String,
    rent: i64,
) -> Result<floor::Model> {
    if !is_manager(db, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }
    if name.trim().is_empty() {
        return Err(Error::MissingField {
            field: "floor name",
        });
    }
    if rent < 0 {
        return Err(Error::InvalidAmount { amount: rent });
    }

    let created = floor::ActiveModel {
        pid: Set(property_id),
        name: Set(name.trim().to_string()),
        rent: Set(rent),
        tenant: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(created)
}

/// All properties the user manages, newest first.
pub async fn properties_managed_by(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<property::Model>> {
    let links = CareOf::find()
        .filter(care_of::Column::Uid.eq(user_id))
        .all(db)
        .await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }
    let pids: Vec<i64> = links.iter().map(|link| link.pid).collect();

    Property::find()
        .filter(property::Column::Id.is_in(pids))
        .order_by_desc(property::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All properties in which the user currently rents a floor, newest first.
pub async fn properties_rented_by(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<property::Model>> {
    let floors = Floor::find()
        .filter(floor::Column::Tenant.eq(user_id))
        .all(db)
        .await?;
    if floors.is_empty() {
        return Ok(Vec::new());
    }
    let mut pids: Vec<i64> = floors.iter().map(|f| f.pid).collect();
    pids.sort_unstable();
    pids.dedup();

    Property::find()
        .filter(property::Column::Id.is_in(pids))
        .order_by_desc(property::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the floors of a property with tenant names and pending flags,
/// newest first. Manager-only.
pub async fn floors_of_property(
    db: &DatabaseConnection,
    user_id: i64,
    property_id: i64,
) -> Result<Vec<FloorOverview>> {
    if !is_manager(db, user_id, property_id).await? {
        return Err(Error::NotManager {
            user_id,
            property_id,
        });
    }

    let floors = Floor::find()
        .filter(floor::Column::Pid.eq(property_id))
        .order_by_desc(floor::Column::CreatedAt)
        .all(db)
        .await?;

    let mut overviews = Vec::with_capacity(floors.len());
    for floor_row in floors {
        let tenant_name = match floor_row.tenant {
            Some(tenant_id) => Some(user_display_name(db, tenant_id).await?),
            None => None,
        };
        let has_pending_request =
            crate::core::notify::floor_has_pending_request(db, floor_row.id).await?;
        let has_pending_advance = crate::core::advance::has_pending(db, floor_row.id).await?;
        overviews.push(FloorOverview {
            floor: floor_row,
            tenant_name,
            has_pending_request,
            has_pending_advance,
        });
    }
    Ok(overviews)
}

/// Fetches one floor of a property with its tenant's display name.
/// Manager-only.
pub async fn floor_by_id(
    db: &DatabaseConnection,
    user_id: i64,
    property_id: i64,
    floor_id: i64,
) -> Result<(floor::Model, Option<String>)> {
    if !is_manager(db, user_id, property_id).await? {
        return Err(Error::NotManager {
            user_id,
            property_id,
        });
    }

    let floor_row = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let tenant_name = match floor_row.tenant {
        Some(tenant_id) => Some(user_display_name(db, tenant_id).await?),
        None => None,
    };
    Ok((floor_row, tenant_name))
}

/// Directly assigns the user behind `phone` as the tenant of a floor,
/// bypassing the request/accept flow. Manager-only.
pub async fn assign_tenant(
    db: &DatabaseConnection,
    manager_id: i64,
    property_id: i64,
    floor_id: i64,
    phone: &str,
) -> Result<floor::Model> {
    if !is_manager(db, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }

    let tenant = find_user_by_phone(db, phone)
        .await?
        .ok_or_else(|| Error::PhoneNotRegistered {
            phone: phone.to_string(),
        })?;

    let floor_row = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .one(db)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    let mut active: floor::ActiveModel = floor_row.into();
    active.tenant = Set(Some(tenant.id));
    active.update(db).await.map_err(Into::into)
}

/// Vacates a floor. Manager-only; the floor must currently be occupied.
/// The guard, the occupancy check and the update run in one transaction.
pub async fn remove_tenant(
    db: &DatabaseConnection,
    manager_id: i64,
    property_id: i64,
    floor_id: i64,
) -> Result<floor::Model> {
    let txn = db.begin().await?;

    if !is_manager(&txn, manager_id, property_id).await? {
        return Err(Error::NotManager {
            user_id: manager_id,
            property_id,
        });
    }

    let floor_row = Floor::find()
        .filter(floor::Column::Id.eq(floor_id))
        .filter(floor::Column::Pid.eq(property_id))
        .one(&txn)
        .await?
        .ok_or(Error::FloorNotFound { id: floor_id })?;

    if floor_row.tenant.is_none() {
        return Err(Error::FloorVacant { floor_id });
    }

    let mut active: floor::ActiveModel = floor_row.into();
    active.tenant = Set(None);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Looks a user up by exact phone number.
pub async fn find_user_by_phone(
    db: &DatabaseConnection,
    phone: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::PhoneNumber.eq(phone))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All registered users, the phone directory managers pick tenants from.
pub async fn user_phone_directory(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A user's display name, falling back to `"User <id>"` when the stored
/// name is empty.
pub async fn user_display_name<C>(db: &C, user_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let found = User::find_by_id(user_id).one(db).await?;
    Ok(match found {
        Some(u) if !u.name.trim().is_empty() => u.name,
        _ => format!("User {user_id}"),
    })
}
