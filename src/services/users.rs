//! User account management with role scoping.

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::db::repository::FullRepository;
use crate::models::{NewUser, Role, User, UserId, UserUpdate};

fn validate_email(email: &str) -> ServiceResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ServiceError::validation("invalid email address"));
    }
    Ok(())
}

/// Self-service registration. Always creates a tenant account regardless of
/// the requested role.
pub async fn register(repo: &dyn FullRepository, mut new_user: NewUser) -> ServiceResult<User> {
    validate_email(&new_user.email)?;
    new_user.role = Role::Tenant;
    let user = repo.create_user(new_user).await?;
    info!(user_id = %user.id, "registered new tenant account");
    Ok(user)
}

/// Staff-created account. Only superadmins may grant staff roles.
pub async fn create_user(
    repo: &dyn FullRepository,
    actor: &User,
    new_user: NewUser,
) -> ServiceResult<User> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can create accounts"));
    }
    if new_user.role.is_staff() && !actor.is_superadmin() {
        return Err(ServiceError::forbidden(
            "only superadmins can grant staff roles",
        ));
    }
    validate_email(&new_user.email)?;
    let user = repo.create_user(new_user).await?;
    info!(user_id = %user.id, role = %user.role, "created user account");
    Ok(user)
}

pub async fn list_users(repo: &dyn FullRepository, actor: &User) -> ServiceResult<Vec<User>> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can list accounts"));
    }
    Ok(repo.list_users().await?)
}

/// Staff can fetch anyone; tenants only themselves.
pub async fn get_user(repo: &dyn FullRepository, actor: &User, id: UserId) -> ServiceResult<User> {
    if !actor.is_admin() && actor.id != id {
        return Err(ServiceError::forbidden("cannot view another user's account"));
    }
    Ok(repo.get_user(id).await?)
}

/// Update an account.
///
/// Tenants may edit their own profile fields; role and account-state flags
/// are staff-only, and role changes are restricted to superadmins.
pub async fn update_user(
    repo: &dyn FullRepository,
    actor: &User,
    id: UserId,
    update: UserUpdate,
) -> ServiceResult<User> {
    if !actor.is_admin() && actor.id != id {
        return Err(ServiceError::forbidden("cannot edit another user's account"));
    }
    if !actor.is_admin() && (update.role.is_some() || update.is_active.is_some() || update.is_verified.is_some()) {
        return Err(ServiceError::forbidden(
            "role and account flags can only be changed by staff",
        ));
    }
    if update.role.is_some() && !actor.is_superadmin() {
        return Err(ServiceError::forbidden("only superadmins can change roles"));
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }
    let user = repo.update_user(id, update).await?;
    info!(user_id = %user.id, "updated user account");
    Ok(user)
}

/// Superadmin-only account deletion.
pub async fn delete_user(
    repo: &dyn FullRepository,
    actor: &User,
    id: UserId,
) -> ServiceResult<()> {
    if !actor.is_superadmin() {
        return Err(ServiceError::forbidden("only superadmins can delete accounts"));
    }
    if actor.id == id {
        return Err(ServiceError::validation("cannot delete your own account"));
    }
    repo.delete_user(id).await?;
    info!(user_id = %id, "deleted user account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::models::Role;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            phone_number: "".into(),
            role,
        }
    }

    async fn staff(repo: &LocalRepository, role: Role) -> User {
        use crate::db::repository::UserRepository;
        let user = repo
            .create_user(new_user(&format!("{}@example.com", role), Role::Tenant))
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
    async fn test_register_forces_tenant_role() {
        let repo = LocalRepository::new();
        let user = register(&repo, new_user("sneaky@example.com", Role::Superadmin))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Tenant);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let repo = LocalRepository::new();
        assert!(matches!(
            register(&repo, new_user("no-at-sign", Role::Tenant)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_only_superadmin_grants_staff_roles() {
        let repo = LocalRepository::new();
        let admin = staff(&repo, Role::Admin).await;
        let superadmin = staff(&repo, Role::Superadmin).await;

        let result = create_user(&repo, &admin, new_user("a@example.com", Role::Admin)).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let created = create_user(&repo, &superadmin, new_user("b@example.com", Role::Admin))
            .await
            .unwrap();
        assert_eq!(created.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_tenant_cannot_change_own_role() {
        let repo = LocalRepository::new();
        let tenant = register(&repo, new_user("t@example.com", Role::Tenant))
            .await
            .unwrap();
        let result = update_user(
            &repo,
            &tenant,
            tenant.id,
            UserUpdate {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_tenant_can_edit_own_profile() {
        let repo = LocalRepository::new();
        let tenant = register(&repo, new_user("t@example.com", Role::Tenant))
            .await
            .unwrap();
        let updated = update_user(
            &repo,
            &tenant,
            tenant.id,
            UserUpdate {
                first_name: Some("Renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.first_name, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_requires_superadmin_and_not_self() {
        let repo = LocalRepository::new();
        let admin = staff(&repo, Role::Admin).await;
        let superadmin = staff(&repo, Role::Superadmin).await;
        let tenant = register(&repo, new_user("t@example.com", Role::Tenant))
            .await
            .unwrap();

        assert!(matches!(
            delete_user(&repo, &admin, tenant.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            delete_user(&repo, &superadmin, superadmin.id).await,
            Err(ServiceError::Validation(_))
        ));
        delete_user(&repo, &superadmin, tenant.id).await.unwrap();
    }
}
