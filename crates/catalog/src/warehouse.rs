use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, WarehouseId};

/// Warehouse reference data. Owned externally; the engine only ever refers
/// to a warehouse by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    code: String,
    name: String,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let code = code.into();
        let name = name.into();

        if code.trim().is_empty() {
            return Err(DomainError::validation("code cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self { id, code, name })
    }

    pub fn id_typed(&self) -> WarehouseId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
