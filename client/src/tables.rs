//! Table and view names the front-end uses, mapped to API routes

use uuid::Uuid;

use crate::error::ClientError;

/// What a generic table call does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Single,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Select,
        Operation::Single,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Single => "single",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// HTTP method name the operation is sent with
    pub fn method_name(&self) -> &'static str {
        match self {
            Operation::Select | Operation::Single => "GET",
            Operation::Insert => "POST",
            Operation::Update => "PUT",
            Operation::Delete => "DELETE",
        }
    }

    /// Single, update and delete address one row by id
    pub fn targets_row(&self) -> bool {
        matches!(self, Operation::Single | Operation::Update | Operation::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Fields,
    Lots,
    Bins,
    Warehouses,
    InventoryMovements,
    Sales,
    Buyers,
    Seasons,
    Crops,
    Varieties,
    WorkTypes,
    Works,
    Expenses,
    Profiles,
    /// Per-bin, per-lot stock view
    BinLotStock,
}

impl Table {
    pub const ALL: [Table; 15] = [
        Table::Fields,
        Table::Lots,
        Table::Bins,
        Table::Warehouses,
        Table::InventoryMovements,
        Table::Sales,
        Table::Buyers,
        Table::Seasons,
        Table::Crops,
        Table::Varieties,
        Table::WorkTypes,
        Table::Works,
        Table::Expenses,
        Table::Profiles,
        Table::BinLotStock,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Fields => "fields",
            Table::Lots => "lots",
            Table::Bins => "bins",
            Table::Warehouses => "warehouses",
            Table::InventoryMovements => "inventory_movements",
            Table::Sales => "sales",
            Table::Buyers => "buyers",
            Table::Seasons => "seasons",
            Table::Crops => "crops",
            Table::Varieties => "varieties",
            Table::WorkTypes => "work_types",
            Table::Works => "works",
            Table::Expenses => "expenses",
            Table::Profiles => "profiles",
            Table::BinLotStock => "v_bin_lot_stock",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Route below `/api/v1`
    pub fn route(&self) -> &'static str {
        match self {
            Table::Fields => "/fields",
            Table::Lots => "/lots",
            Table::Bins => "/bins",
            Table::Warehouses => "/warehouses",
            Table::InventoryMovements => "/inventory/movements",
            Table::Sales => "/sales",
            Table::Buyers => "/buyers",
            Table::Seasons => "/seasons",
            Table::Crops => "/crops",
            Table::Varieties => "/varieties",
            Table::WorkTypes => "/work-types",
            Table::Works => "/works",
            Table::Expenses => "/expenses",
            Table::Profiles => "/profiles",
            Table::BinLotStock => "/inventory/stock",
        }
    }

    /// Seasons, crops, varieties, work types and profiles are administered
    /// elsewhere; the stock view is computed
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Table::Seasons
                | Table::Crops
                | Table::Varieties
                | Table::WorkTypes
                | Table::Profiles
                | Table::BinLotStock
        )
    }

    /// Which generic calls the API serves for this table
    ///
    /// Bins are created below their warehouse (`FarmClient::create_bin`),
    /// movements are append-only and the stock view has no row ids.
    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::Select => true,
            Operation::Single => *self != Table::BinLotStock,
            Operation::Insert => !self.is_read_only() && *self != Table::Bins,
            Operation::Update => !self.is_read_only() && *self != Table::InventoryMovements,
            Operation::Delete => !self.is_read_only(),
        }
    }

    /// Path of the request below `/api/v1`; `id` is used by row operations
    pub fn path(&self, operation: Operation, id: Option<Uuid>) -> Result<String, ClientError> {
        let unsupported = || ClientError::Unsupported {
            table: self.name(),
            operation: operation.as_str(),
        };
        if !self.supports(operation) {
            return Err(unsupported());
        }
        match (operation.targets_row(), id) {
            (true, Some(id)) => Ok(format!("{}/{}", self.route(), id)),
            (true, None) => Err(unsupported()),
            (false, _) => Ok(self.route().to_string()),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
