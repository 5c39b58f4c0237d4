//! Building and room inventory management.

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::db::repository::FullRepository;
use crate::models::{Building, BuildingId, NewBuilding, NewRoom, Room, RoomId, User};

pub async fn create_building(
    repo: &dyn FullRepository,
    actor: &User,
    new_building: NewBuilding,
) -> ServiceResult<Building> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can manage buildings"));
    }
    if new_building.name.trim().is_empty() {
        return Err(ServiceError::validation("building name must not be empty"));
    }
    let building = repo.create_building(new_building).await?;
    info!(building_id = %building.id, name = %building.name, "created building");
    Ok(building)
}

pub async fn get_building(
    repo: &dyn FullRepository,
    id: BuildingId,
) -> ServiceResult<Building> {
    Ok(repo.get_building(id).await?)
}

pub async fn list_buildings(repo: &dyn FullRepository) -> ServiceResult<Vec<Building>> {
    Ok(repo.list_buildings().await?)
}

pub async fn delete_building(
    repo: &dyn FullRepository,
    actor: &User,
    id: BuildingId,
) -> ServiceResult<()> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can manage buildings"));
    }
    repo.delete_building(id).await?;
    info!(building_id = %id, "deleted building");
    Ok(())
}

pub async fn create_room(
    repo: &dyn FullRepository,
    actor: &User,
    new_room: NewRoom,
) -> ServiceResult<Room> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can manage rooms"));
    }
    new_room.validate().map_err(ServiceError::Validation)?;
    let room = repo.create_room(new_room).await?;
    info!(room_id = %room.id, building_id = %room.building_id, "created room");
    Ok(room)
}

pub async fn get_room(repo: &dyn FullRepository, id: RoomId) -> ServiceResult<Room> {
    Ok(repo.get_room(id).await?)
}

/// List rooms, optionally restricted to one building.
pub async fn list_rooms(
    repo: &dyn FullRepository,
    building_id: Option<BuildingId>,
) -> ServiceResult<Vec<Room>> {
    Ok(repo.list_rooms(building_id).await?)
}

pub async fn delete_room(
    repo: &dyn FullRepository,
    actor: &User,
    id: RoomId,
) -> ServiceResult<()> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can manage rooms"));
    }
    repo.delete_room(id).await?;
    info!(room_id = %id, "deleted room");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::UserRepository;
    use crate::db::LocalRepository;
    use crate::models::{NewUser, Role, UserUpdate};

    async fn user_with_role(repo: &LocalRepository, email: &str, role: Role) -> User {
        let user = repo
            .create_user(NewUser {
                email: email.into(),
                first_name: "Test".into(),
                last_name: "User".into(),
                phone_number: "".into(),
                role: Role::Tenant,
            })
            .await
            .unwrap();
        repo.update_user(
            user.id,
            UserUpdate {
                role: Some(role),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_tenant_cannot_create_building() {
        let repo = LocalRepository::new();
        let tenant = user_with_role(&repo, "t@example.com", Role::Tenant).await;
        let result = create_building(
            &repo,
            &tenant,
            NewBuilding {
                name: "Block A".into(),
                address: "1 Main St".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_manages_inventory() {
        let repo = LocalRepository::new();
        let admin = user_with_role(&repo, "a@example.com", Role::Admin).await;

        let building = create_building(
            &repo,
            &admin,
            NewBuilding {
                name: "Block A".into(),
                address: "1 Main St".into(),
            },
        )
        .await
        .unwrap();

        let room = create_room(
            &repo,
            &admin,
            NewRoom {
                building_id: building.id,
                room_number: 12,
            },
        )
        .await
        .unwrap();
        assert!(!room.is_occupied);

        // Building with rooms cannot be deleted.
        assert!(matches!(
            delete_building(&repo, &admin, building.id).await,
            Err(ServiceError::Conflict(_))
        ));

        delete_room(&repo, &admin, room.id).await.unwrap();
        delete_building(&repo, &admin, building.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_room_number_validated() {
        let repo = LocalRepository::new();
        let admin = user_with_role(&repo, "a@example.com", Role::Admin).await;
        let building = create_building(
            &repo,
            &admin,
            NewBuilding {
                name: "Block A".into(),
                address: "1 Main St".into(),
            },
        )
        .await
        .unwrap();
        let result = create_room(
            &repo,
            &admin,
            NewRoom {
                building_id: building.id,
                room_number: -3,
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
