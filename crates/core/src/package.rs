//! Package, module, struct and function declarations
//!
//! A package is an immutable, versioned bundle of modules. Upgrading a
//! package publishes a new package object at a new address that shares the
//! `original_id` of the first version and records:
//!
//! - **linkage**: original address of each dependency → upgraded address
//!   actually resolved at runtime
//! - **type origins**: for every struct, the address of the package version
//!   that first defined it
//!
//! Types are always named by their defining address, so a struct declared in
//! v1 keeps the same canonical type after v2 and v3 are published.

use crate::address::Address;
use crate::signature::OpenSignature;
use crate::types::SequenceNumber;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Abilities
// =============================================================================

/// One Move ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ability {
    /// Values can be copied
    Copy,
    /// Values can be dropped
    Drop,
    /// Values can be stored inside other structs
    Store,
    /// Values are top-level objects
    Key,
}

impl Ability {
    /// All abilities in canonical order
    pub const ALL: [Ability; 4] = [Ability::Copy, Ability::Drop, Ability::Store, Ability::Key];

    fn bit(self) -> u8 {
        match self {
            Ability::Copy => 0b0001,
            Ability::Drop => 0b0010,
            Ability::Store => 0b0100,
            Ability::Key => 0b1000,
        }
    }

    /// Lowercase keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Ability::Copy => "copy",
            Ability::Drop => "drop",
            Ability::Store => "store",
            Ability::Key => "key",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of {copy, drop, store, key}
///
/// Iterates in canonical order regardless of insertion order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AbilitySet(u8);

impl AbilitySet {
    /// No abilities
    pub const EMPTY: AbilitySet = AbilitySet(0);

    /// Build from a list of abilities
    pub fn from_abilities(abilities: &[Ability]) -> Self {
        abilities.iter().copied().collect()
    }

    /// Membership test
    pub fn has(&self, ability: Ability) -> bool {
        self.0 & ability.bit() != 0
    }

    /// Add an ability
    pub fn insert(&mut self, ability: Ability) {
        self.0 |= ability.bit();
    }

    /// True if every ability in `other` is present here
    pub fn is_superset_of(&self, other: &AbilitySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Abilities in canonical order
    pub fn iter(&self) -> impl Iterator<Item = Ability> + '_ {
        Ability::ALL.into_iter().filter(move |a| self.has(*a))
    }

    /// Number of abilities
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if no abilities are present
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Ability> for AbilitySet {
    fn from_iter<I: IntoIterator<Item = Ability>>(iter: I) -> Self {
        let mut set = AbilitySet::EMPTY;
        for a in iter {
            set.insert(a);
        }
        set
    }
}

impl fmt::Debug for AbilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for AbilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for AbilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<Ability>::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// Type parameter of a struct declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructTypeParameter {
    /// Abilities every argument must have
    pub constraints: AbilitySet,
    /// Phantom parameters do not appear in field types
    pub is_phantom: bool,
}

/// One named field of a struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Declared type, may mention the struct's type parameters
    #[serde(rename = "type")]
    pub signature: OpenSignature,
}

/// Struct declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDecl {
    /// Struct name
    pub name: String,
    /// Declared abilities
    pub abilities: AbilitySet,
    /// Type parameters
    pub type_parameters: Vec<StructTypeParameter>,
    /// Fields in declaration order
    pub fields: Vec<FieldDecl>,
}

/// Function visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Callable from any module
    Public,
    /// Callable from declared friends
    Friend,
    /// Callable from the same module only
    Private,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Visibility
    pub visibility: Visibility,
    /// Entry functions may be called directly from a transaction
    pub is_entry: bool,
    /// Constraints on each type parameter
    pub type_parameters: Vec<AbilitySet>,
    /// Parameter types
    pub parameters: Vec<OpenSignature>,
    /// Return types
    #[serde(rename = "return")]
    pub returns: Vec<OpenSignature>,
}

/// Module declaration; structs and functions are keyed (and ordered) by name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// Module name
    pub name: String,
    /// Structs by name
    pub structs: BTreeMap<String, StructDecl>,
    /// Functions by name
    pub functions: BTreeMap<String, FunctionDecl>,
}

impl ModuleDecl {
    /// Empty module
    pub fn new(name: impl Into<String>) -> Self {
        ModuleDecl {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style struct insertion
    pub fn with_struct(mut self, decl: StructDecl) -> Self {
        self.structs.insert(decl.name.clone(), decl);
        self
    }

    /// Builder-style function insertion
    pub fn with_function(mut self, decl: FunctionDecl) -> Self {
        self.functions.insert(decl.name.clone(), decl);
        self
    }
}

/// Where a dependency resolves after upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInfo {
    /// Address of the package version linked at runtime
    pub upgraded_id: Address,
    /// Version of that package
    pub upgraded_version: SequenceNumber,
}

/// The package version that first defined a struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOrigin {
    /// Module name
    pub module: String,
    /// Struct name
    pub struct_name: String,
    /// Defining package address
    pub defining_id: Address,
}

/// A published package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDecl {
    /// Address of this package version
    pub id: Address,
    /// Address of the first version of this package
    pub original_id: Address,
    /// Package version, starting at 1
    pub version: SequenceNumber,
    /// Modules by name
    pub modules: BTreeMap<String, ModuleDecl>,
    /// Dependency original address → linked upgrade
    pub linkage: BTreeMap<Address, UpgradeInfo>,
    /// Defining package for every struct in this package
    pub type_origins: Vec<TypeOrigin>,
}

impl PackageDecl {
    /// First version of a package; every struct is defined here
    pub fn genesis(id: Address, modules: Vec<ModuleDecl>) -> Self {
        let type_origins = modules
            .iter()
            .flat_map(|m| {
                m.structs.keys().map(move |s| TypeOrigin {
                    module: m.name.clone(),
                    struct_name: s.clone(),
                    defining_id: id,
                })
            })
            .collect();
        PackageDecl {
            id,
            original_id: id,
            version: SequenceNumber(1),
            modules: modules.into_iter().map(|m| (m.name.clone(), m)).collect(),
            linkage: BTreeMap::new(),
            type_origins,
        }
    }

    /// Publish an upgrade at `new_id`
    ///
    /// Structs that already existed keep their defining address; new structs
    /// are defined by `new_id`.
    pub fn upgrade(&self, new_id: Address, modules: Vec<ModuleDecl>) -> PackageDecl {
        let mut type_origins = Vec::new();
        for m in &modules {
            for s in m.structs.keys() {
                let defining_id = self.defining_id(&m.name, s).unwrap_or(new_id);
                type_origins.push(TypeOrigin {
                    module: m.name.clone(),
                    struct_name: s.clone(),
                    defining_id,
                });
            }
        }
        PackageDecl {
            id: new_id,
            original_id: self.original_id,
            version: self.version.next(),
            modules: modules.into_iter().map(|m| (m.name.clone(), m)).collect(),
            linkage: self.linkage.clone(),
            type_origins,
        }
    }

    /// Builder-style dependency linkage
    pub fn with_linkage(mut self, original: Address, upgraded: UpgradeInfo) -> Self {
        self.linkage.insert(original, upgraded);
        self
    }

    /// Module by name
    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.get(name)
    }

    /// Struct by module and name
    pub fn find_struct(&self, module: &str, name: &str) -> Option<&StructDecl> {
        self.modules.get(module)?.structs.get(name)
    }

    /// Address of the package version that first defined `module::name`
    pub fn defining_id(&self, module: &str, name: &str) -> Option<Address> {
        self.type_origins
            .iter()
            .find(|o| o.module == module && o.struct_name == name)
            .map(|o| o.defining_id)
    }

    /// Runtime address for a dependency known by its original address
    pub fn relocate(&self, original_id: &Address) -> Address {
        if *original_id == self.original_id {
            return self.id;
        }
        self.linkage
            .get(original_id)
            .map(|u| u.upgraded_id)
            .unwrap_or(*original_id)
    }
}
