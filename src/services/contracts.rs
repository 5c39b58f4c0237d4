//! Lease contract management.

use chrono::Utc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::api::ContractFilter;
use crate::db::repository::FullRepository;
use crate::models::{Contract, ContractId, NewContract, RentPayment, User};

/// Create a contract and its full payment schedule. Staff only.
///
/// The per-room overlap invariant is enforced inside the repository under a
/// room lock; a clash comes back as [`ServiceError::Conflict`].
pub async fn create_contract(
    repo: &dyn FullRepository,
    actor: &User,
    new_contract: NewContract,
) -> ServiceResult<(Contract, Vec<RentPayment>)> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can create contracts"));
    }
    new_contract.validate().map_err(ServiceError::Validation)?;

    // The tenant must exist and hold a tenant account.
    let tenant = repo.get_user(new_contract.user_id).await?;
    if !tenant.is_tenant() {
        return Err(ServiceError::validation(
            "contracts can only be assigned to tenant accounts",
        ));
    }

    let today = Utc::now().date_naive();
    let (contract, payments) = repo.create_contract(new_contract, today).await?;
    info!(
        contract_id = %contract.id,
        user_id = %contract.user_id,
        room_id = %contract.room_id,
        months = payments.len(),
        "created contract with payment schedule"
    );
    Ok((contract, payments))
}

/// Staff see every contract; tenants only their own.
pub async fn list_contracts(
    repo: &dyn FullRepository,
    actor: &User,
    mut filter: ContractFilter,
) -> ServiceResult<Vec<Contract>> {
    if !actor.is_admin() {
        filter.user_id = Some(actor.id);
    }
    Ok(repo.list_contracts(filter).await?)
}

pub async fn get_contract(
    repo: &dyn FullRepository,
    actor: &User,
    id: ContractId,
) -> ServiceResult<Contract> {
    let contract = repo.get_contract(id).await?;
    if !actor.is_admin() && contract.user_id != actor.id {
        return Err(ServiceError::NotFound("contract not found".into()));
    }
    Ok(contract)
}

/// Delete a contract and its payment rows. Staff only.
pub async fn delete_contract(
    repo: &dyn FullRepository,
    actor: &User,
    id: ContractId,
) -> ServiceResult<()> {
    if !actor.is_admin() {
        return Err(ServiceError::forbidden("only staff can delete contracts"));
    }
    repo.delete_contract(id).await?;
    info!(contract_id = %id, "deleted contract");
    Ok(())
}
