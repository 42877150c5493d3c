// src/services/address_service.rs

use std::sync::Arc;

use crate::common::error::AppError;
use crate::common::formatting::sort_key;
use crate::db::AddressRepository;
use crate::models::dto::MessageResponse;
use crate::models::Address;

#[derive(Clone)]
pub struct AddressService {
    addresses: Arc<dyn AddressRepository>,
}

impl AddressService {
    pub fn new(addresses: Arc<dyn AddressRepository>) -> Self {
        Self { addresses }
    }

    pub async fn list(&self, sorted: bool) -> Result<Vec<Address>, AppError> {
        let mut addresses = self.addresses.find_all().await?;
        if sorted {
            addresses.sort_by_cached_key(|a| sort_key(&a.street));
        }
        Ok(addresses)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Address>, AppError> {
        self.addresses.find_by_id(id).await
    }

    pub async fn save(&self, address: Address) -> Result<Address, AppError> {
        self.addresses.save(address.normalized()).await
    }

    pub async fn update(&self, address: Address) -> Result<Address, AppError> {
        if address.id.is_none() {
            return Err(AppError::MissingInput("ID do Endereço não informado!".into()));
        }
        self.save(address).await
    }

    pub async fn delete(&self, address: &Address) -> Result<MessageResponse, AppError> {
        let id = address
            .id
            .ok_or_else(|| AppError::MissingInput("ID do Endereço não informado!".into()))?;

        if !self.addresses.delete(id).await? {
            return Err(AppError::exists_or_missing(
                "Entidade nao foi deletada: Endereço com o ID informado não Existe!",
                "ENDEREÇO NÃO CADASTRADO",
            ));
        }
        Ok(MessageResponse::new("Endereço DELETADO no Sistema!"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    #[tokio::test]
    async fn save_update_and_delete() {
        let service = AddressService::new(Arc::new(InMemoryStore::new()));
        let saved = service
            .save(Address {
                street: " Rua B ".into(),
                state: "am".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.street, "Rua B");
        assert_eq!(saved.state, "AM");

        let updated = service
            .update(Address {
                number: "12".into(),
                ..saved.clone()
            })
            .await
            .unwrap();
        assert_eq!(updated.version, saved.version + 1);

        let msg = service.delete(&updated).await.unwrap();
        assert_eq!(msg.mensagem, "Endereço DELETADO no Sistema!");
        assert!(service.find_by_id(saved.id.unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let service = AddressService::new(Arc::new(InMemoryStore::new()));
        let err = service.update(Address::default()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingInput(_)));
    }
}
