use crate::domain;
use crate::domain::owner::driven_ports::{OwnerReader, OwnerWriter};
use crate::domain::owner::driving_ports::{OwnerError, SavedOwner};
use crate::external_connections::{ExternalConnectivity, Transactable};
use anyhow::Context;
use tracing::info;
use uuid::Uuid;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub zip: String,
    pub city: String,
}

/// A car shop owner. The address is optional and belongs to exactly one owner.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Owner {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

/// Content of an owner as received from a client. The id may be absent; what that means depends
/// on the operation it is used for.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct OwnerData {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl OwnerData {
    fn into_owner(self, id: Uuid) -> Owner {
        Owner {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}

pub mod driven_ports {
    use super::*;

    pub trait OwnerReader {
        async fn find_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Owner>, anyhow::Error>;
        async fn select_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Owner>, anyhow::Error>;
    }

    /// Stages writes of owners together with their address. Every operation returns the number of
    /// owner rows it touched.
    pub trait OwnerWriter {
        async fn add(
            &self,
            owner: &Owner,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Adds every given owner along with its address, used to seed a store
        async fn add_range(
            &self,
            owners: &[Owner],
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Overwrites the stored owner with the same id, replacing its address. Fails if there is
        /// none.
        async fn update(
            &self,
            owner: &Owner,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Removes the owner and its address if they exist, does nothing otherwise
        async fn remove(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;

        /// Removes every owner and address. Returns the number of owners removed.
        async fn remove_all(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum OwnerError {
        #[error("owner {0} does not exist")]
        NotFound(Uuid),
        #[error("owner {0} already exists")]
        AlreadyExists(Uuid),
        #[error("route id {route_id} does not match owner id {body_id}")]
        IdMismatch { route_id: Uuid, body_id: Uuid },
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    /// Result of writing an owner by id, which creates the owner if it didn't exist yet
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SavedOwner {
        Updated(Owner),
        Created(Owner),
    }

    pub trait OwnerPort {
        async fn owner_by_id(
            &self,
            id: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl driven_ports::OwnerReader,
        ) -> Result<Option<Owner>, anyhow::Error>;
        async fn all_owners(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            owner_read: &impl driven_ports::OwnerReader,
        ) -> Result<Vec<Owner>, anyhow::Error>;
        async fn create_owner(
            &self,
            new_owner: &OwnerData,
            ext_cxn: &mut impl Transactable,
            owner_read: &impl driven_ports::OwnerReader,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<Owner, OwnerError>;
        async fn save_owner(
            &self,
            id: Uuid,
            owner_data: &OwnerData,
            ext_cxn: &mut impl Transactable,
            owner_read: &impl driven_ports::OwnerReader,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<SavedOwner, OwnerError>;
        async fn delete_owner(
            &self,
            id: Uuid,
            ext_cxn: &mut impl Transactable,
            owner_read: &impl driven_ports::OwnerReader,
            owner_write: &impl driven_ports::OwnerWriter,
        ) -> Result<(), OwnerError>;
    }
}

pub struct OwnerService;

impl driving_ports::OwnerPort for OwnerService {
    async fn owner_by_id(
        &self,
        id: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
    ) -> Result<Option<Owner>, anyhow::Error> {
        owner_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("fetching an owner by id")
    }

    async fn all_owners(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        owner_read: &impl OwnerReader,
    ) -> Result<Vec<Owner>, anyhow::Error> {
        owner_read
            .select_all(&mut *ext_cxn)
            .await
            .context("fetching all owners")
    }

    async fn create_owner(
        &self,
        new_owner: &OwnerData,
        ext_cxn: &mut impl Transactable,
        owner_read: &impl OwnerReader,
        owner_write: &impl OwnerWriter,
    ) -> Result<Owner, OwnerError> {
        let id = domain::assign_id(new_owner.id);
        let existing = owner_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("checking for an existing owner")?;
        if existing.is_some() {
            return Err(OwnerError::AlreadyExists(id));
        }

        let owner = new_owner.clone().into_owner(id);
        let mut txn = ext_cxn.start_transaction().await?;
        let rows_staged = owner_write
            .add(&owner, &mut txn)
            .await
            .context("adding an owner")?;
        domain::save_changes(txn, rows_staged).await?;
        info!(%id, "Created owner");

        Ok(owner)
    }

    async fn save_owner(
        &self,
        id: Uuid,
        owner_data: &OwnerData,
        ext_cxn: &mut impl Transactable,
        owner_read: &impl OwnerReader,
        owner_write: &impl OwnerWriter,
    ) -> Result<SavedOwner, OwnerError> {
        if let Some(body_id) = owner_data.id.filter(|body_id| !body_id.is_nil()) {
            if body_id != id {
                return Err(OwnerError::IdMismatch {
                    route_id: id,
                    body_id,
                });
            }
        }

        let existing = owner_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("looking up the owner to save")?;

        let owner = owner_data.clone().into_owner(id);
        let mut txn = ext_cxn.start_transaction().await?;
        let saved = if existing.is_some() {
            let rows_staged = owner_write
                .update(&owner, &mut txn)
                .await
                .context("updating an owner")?;
            domain::save_changes(txn, rows_staged).await?;
            SavedOwner::Updated(owner)
        } else {
            let rows_staged = owner_write
                .add(&owner, &mut txn)
                .await
                .context("adding an owner by id")?;
            domain::save_changes(txn, rows_staged).await?;
            info!(%id, "Created owner on save");
            SavedOwner::Created(owner)
        };

        Ok(saved)
    }

    async fn delete_owner(
        &self,
        id: Uuid,
        ext_cxn: &mut impl Transactable,
        owner_read: &impl OwnerReader,
        owner_write: &impl OwnerWriter,
    ) -> Result<(), OwnerError> {
        let existing = owner_read
            .find_by_id(id, &mut *ext_cxn)
            .await
            .context("looking up the owner to delete")?;
        if existing.is_none() {
            return Err(OwnerError::NotFound(id));
        }

        let mut txn = ext_cxn.start_transaction().await?;
        let rows_staged = owner_write
            .remove(id, &mut txn)
            .await
            .context("removing an owner")?;
        if !domain::save_changes(txn, rows_staged).await? {
            return Err(OwnerError::NotFound(id));
        }

        Ok(())
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use anyhow::anyhow;
    use std::sync::{Mutex, RwLock};

    pub struct InMemoryOwnerPersistence {
        pub owners: Vec<Owner>,
        pub connectivity: Connectivity,
    }

    impl InMemoryOwnerPersistence {
        pub fn new() -> InMemoryOwnerPersistence {
            InMemoryOwnerPersistence {
                owners: Vec::new(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_with_owners(owners: &[Owner]) -> InMemoryOwnerPersistence {
            InMemoryOwnerPersistence {
                owners: owners.to_vec(),
                connectivity: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryOwnerPersistence> {
            RwLock::new(Self::new())
        }
    }

    /// Builds an owner without an address under a fresh id
    pub fn owner(first_name: &str, last_name: &str) -> Owner {
        Owner {
            id: Uuid::new_v4(),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: format!(
                "{}.{}@t-online.de",
                first_name.to_lowercase(),
                last_name.to_lowercase()
            ),
            phone: Some("0123 456 7890".to_owned()),
            address: None,
        }
    }

    pub fn owner_with_address(first_name: &str, last_name: &str) -> Owner {
        Owner {
            address: Some(Address {
                street: "Hannoversche Str".to_owned(),
                number: "1a".to_owned(),
                zip: "29221".to_owned(),
                city: "Celle".to_owned(),
            }),
            ..owner(first_name, last_name)
        }
    }

    /// Turns an owner back into request content carrying the given id
    pub fn data_for(owner: &Owner, id: Option<Uuid>) -> OwnerData {
        OwnerData {
            id,
            first_name: owner.first_name.clone(),
            last_name: owner.last_name.clone(),
            email: owner.email.clone(),
            phone: owner.phone.clone(),
            address: owner.address.clone(),
        }
    }

    impl driven_ports::OwnerReader for RwLock<InMemoryOwnerPersistence> {
        async fn find_by_id(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Owner>, anyhow::Error> {
            let persistence = self.read().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            Ok(persistence.owners.iter().find(|owner| owner.id == id).cloned())
        }

        async fn select_all(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Owner>, anyhow::Error> {
            let persistence = self.read().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            Ok(persistence.owners.clone())
        }
    }

    impl driven_ports::OwnerWriter for RwLock<InMemoryOwnerPersistence> {
        async fn add(
            &self,
            owner: &Owner,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence.owners.push(owner.clone());
            Ok(1)
        }

        async fn add_range(
            &self,
            owners: &[Owner],
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            persistence.owners.extend_from_slice(owners);
            Ok(owners.len() as u64)
        }

        async fn update(
            &self,
            owner: &Owner,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            let stored = persistence
                .owners
                .iter_mut()
                .find(|stored| stored.id == owner.id)
                .ok_or_else(|| anyhow!("Update, owner {} not found", owner.id))?;
            *stored = owner.clone();

            Ok(1)
        }

        async fn remove(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            let count_before = persistence.owners.len();
            persistence.owners.retain(|owner| owner.id != id);

            Ok((count_before - persistence.owners.len()) as u64)
        }

        async fn remove_all(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error> {
            let mut persistence = self.write().expect("owner persist rw lock poisoned");
            persistence.connectivity.blow_up_if_disconnected()?;

            let removed = persistence.owners.len();
            persistence.owners.clear();
            Ok(removed as u64)
        }
    }

    pub struct MockOwnerService {
        pub owner_by_id_result: FakeImplementation<Uuid, anyhow::Result<Option<Owner>>>,
        pub all_owners_result: FakeImplementation<(), anyhow::Result<Vec<Owner>>>,
        pub create_owner_result: FakeImplementation<OwnerData, Result<Owner, OwnerError>>,
        pub save_owner_result: FakeImplementation<(Uuid, OwnerData), Result<SavedOwner, OwnerError>>,
        pub delete_owner_result: FakeImplementation<Uuid, Result<(), OwnerError>>,
    }

    impl MockOwnerService {
        pub fn new() -> MockOwnerService {
            MockOwnerService {
                owner_by_id_result: FakeImplementation::new(),
                all_owners_result: FakeImplementation::new(),
                create_owner_result: FakeImplementation::new(),
                save_owner_result: FakeImplementation::new(),
                delete_owner_result: FakeImplementation::new(),
            }
        }
    }

    impl driving_ports::OwnerPort for Mutex<MockOwnerService> {
        async fn owner_by_id(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl ExternalConnectivity,
            _owner_read: &impl OwnerReader,
        ) -> Result<Option<Owner>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock owner service mutex poisoned");
            locked_self.owner_by_id_result.save_arguments(id);

            locked_self.owner_by_id_result.return_value_anyhow()
        }

        async fn all_owners(
            &self,
            _ext_cxn: &mut impl ExternalConnectivity,
            _owner_read: &impl OwnerReader,
        ) -> Result<Vec<Owner>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock owner service mutex poisoned");
            locked_self.all_owners_result.save_arguments(());

            locked_self.all_owners_result.return_value_anyhow()
        }

        async fn create_owner(
            &self,
            new_owner: &OwnerData,
            _ext_cxn: &mut impl Transactable,
            _owner_read: &impl OwnerReader,
            _owner_write: &impl OwnerWriter,
        ) -> Result<Owner, OwnerError> {
            let mut locked_self = self.lock().expect("mock owner service mutex poisoned");
            locked_self
                .create_owner_result
                .save_arguments(new_owner.clone());

            locked_self.create_owner_result.return_value_result()
        }

        async fn save_owner(
            &self,
            id: Uuid,
            owner_data: &OwnerData,
            _ext_cxn: &mut impl Transactable,
            _owner_read: &impl OwnerReader,
            _owner_write: &impl OwnerWriter,
        ) -> Result<SavedOwner, OwnerError> {
            let mut locked_self = self.lock().expect("mock owner service mutex poisoned");
            locked_self
                .save_owner_result
                .save_arguments((id, owner_data.clone()));

            locked_self.save_owner_result.return_value_result()
        }

        async fn delete_owner(
            &self,
            id: Uuid,
            _ext_cxn: &mut impl Transactable,
            _owner_read: &impl OwnerReader,
            _owner_write: &impl OwnerWriter,
        ) -> Result<(), OwnerError> {
            let mut locked_self = self.lock().expect("mock owner service mutex poisoned");
            locked_self.delete_owner_result.save_arguments(id);

            locked_self.delete_owner_result.return_value_result()
        }
    }
}
