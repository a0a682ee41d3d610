//! Type resolution
//!
//! Turns concrete type signatures into layouts by loading the declarations
//! they reference from the snapshot. Package versions are immutable once
//! published, so loaded packages and built layouts are cached across
//! requests. Only successful resolutions are cached; an unknown type is
//! looked up again next time.
//!
//! Each cache entry remembers the earliest checkpoint it was resolved at. A
//! request pinned before that checkpoint bypasses the entry and reads its own
//! snapshot, so a type published later never leaks into an older view.

use crate::limits::Limits;
use chainql_core::{
    build_layout, Ability, AbilitySet, Address, ChainqlError, ChainqlResult, OpenSignatureBody,
    PackageDecl, StructDecl, StructSource, TypeLayout, TypeSignature,
};
use chainql_storage::StoreSnapshot;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Deepest layout the decoder is asked to handle
pub const MAX_LAYOUT_DEPTH: usize = 128;

type DatatypeKey = (Address, String, String);

/// Cached value, known to exist from checkpoint `since` onwards
#[derive(Debug)]
struct Cached<T> {
    value: Arc<T>,
    since: u64,
}

fn cached<K: Eq + Hash, T>(cache: &DashMap<K, Cached<T>>, key: &K, checkpoint: u64) -> Option<Arc<T>> {
    cache
        .get(key)
        .filter(|c| c.since <= checkpoint)
        .map(|c| Arc::clone(&c.value))
}

fn remember<K: Eq + Hash, T>(cache: &DashMap<K, Cached<T>>, key: K, value: &Arc<T>, checkpoint: u64) {
    cache
        .entry(key)
        .and_modify(|c| {
            if checkpoint < c.since {
                c.since = checkpoint;
                c.value = Arc::clone(value);
            }
        })
        .or_insert_with(|| Cached {
            value: Arc::clone(value),
            since: checkpoint,
        });
}

/// Packages loaded for one resolution
struct Closure(HashMap<Address, Arc<PackageDecl>>);

impl StructSource for Closure {
    fn find_struct(&self, package: &Address, module: &str, name: &str) -> Option<&StructDecl> {
        self.0.get(package)?.find_struct(module, name)
    }
}

/// Signature → layout resolver with a shared cache
#[derive(Debug)]
pub struct TypeResolver {
    packages: DashMap<Address, Cached<PackageDecl>>,
    layouts: DashMap<TypeSignature, Cached<TypeLayout>>,
    max_type_argument_depth: usize,
    max_type_nodes: usize,
}

impl TypeResolver {
    /// Resolver enforcing the type limits in `limits`
    pub fn new(limits: &Limits) -> Self {
        TypeResolver {
            packages: DashMap::new(),
            layouts: DashMap::new(),
            max_type_argument_depth: limits.max_type_argument_depth,
            max_type_nodes: limits.max_type_nodes,
        }
    }

    /// Reject signatures above the configured nesting and size limits
    pub fn check_limits(&self, sig: &TypeSignature) -> ChainqlResult<()> {
        sig.check_limits(self.max_type_argument_depth, self.max_type_nodes)?;
        Ok(())
    }

    /// Parse and limit-check a type argument
    pub fn parse(&self, input: &str) -> ChainqlResult<TypeSignature> {
        let sig: TypeSignature = input.parse()?;
        self.check_limits(&sig)?;
        Ok(sig)
    }

    /// Package by address, through the cache
    pub async fn package(&self, id: &Address, snapshot: &StoreSnapshot) -> ChainqlResult<Option<Arc<PackageDecl>>> {
        let checkpoint = snapshot.checkpoint();
        if let Some(p) = cached(&self.packages, id, checkpoint) {
            return Ok(Some(p));
        }
        let loaded = snapshot.package(id).await?;
        if let Some(p) = &loaded {
            remember(&self.packages, *id, p, checkpoint);
        }
        Ok(loaded)
    }

    /// Layout of `sig`
    ///
    /// Fails with `UnknownType` if any referenced struct cannot be found and
    /// with `MalformedSignature` on arity or limit violations.
    pub async fn layout(&self, sig: &TypeSignature, snapshot: &StoreSnapshot) -> ChainqlResult<Arc<TypeLayout>> {
        let checkpoint = snapshot.checkpoint();
        if let Some(layout) = cached(&self.layouts, sig, checkpoint) {
            return Ok(layout);
        }
        self.check_limits(sig)?;

        let closure = self.load_closure(sig, snapshot).await?;
        let layout = Arc::new(build_layout(sig, &closure, MAX_LAYOUT_DEPTH)?);
        debug!(target: "chainql::engine", type_ = %sig, packages = closure.0.len(), checkpoint, "Built layout");
        remember(&self.layouts, sig.clone(), &layout, checkpoint);
        Ok(layout)
    }

    /// Rewrite every struct reference to the package version that defined it
    ///
    /// A struct keeps the address of the package version that first declared
    /// it across upgrades; callers may name it through any later version.
    pub async fn canonicalize(&self, sig: &TypeSignature, snapshot: &StoreSnapshot) -> ChainqlResult<TypeSignature> {
        self.check_limits(sig)?;
        let mut addresses = Vec::new();
        chainql_core::layout::referenced_packages(sig, &mut addresses);

        let mut packages = HashMap::with_capacity(addresses.len());
        for address in addresses {
            let package = self
                .package(&address, snapshot)
                .await?
                .ok_or_else(|| ChainqlError::UnknownType {
                    type_name: sig.repr(),
                })?;
            packages.insert(address, package);
        }
        rewrite_to_defining(sig, &packages)
    }

    /// Abilities of a concrete type
    ///
    /// A struct instantiation keeps a declared ability only if every
    /// non-phantom type argument has the ability it requires (`store` for
    /// `key`).
    pub async fn abilities(&self, sig: &TypeSignature, snapshot: &StoreSnapshot) -> ChainqlResult<AbilitySet> {
        self.check_limits(sig)?;
        let closure = self.load_closure(sig, snapshot).await?;
        abilities_of(sig, &closure)
    }

    async fn load_closure(&self, sig: &TypeSignature, snapshot: &StoreSnapshot) -> ChainqlResult<Closure> {
        let mut pending = Vec::new();
        concrete_datatypes(sig, &mut pending);

        let mut loaded: HashMap<Address, Arc<PackageDecl>> = HashMap::new();
        let mut missing: HashSet<Address> = HashSet::new();
        let mut visited: HashSet<DatatypeKey> = HashSet::new();

        while let Some(key) = pending.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let (address, module, name) = &key;
            if missing.contains(address) {
                continue;
            }
            let package = match loaded.get(address) {
                Some(p) => Arc::clone(p),
                None => match self.package(address, snapshot).await? {
                    Some(p) => {
                        loaded.insert(*address, Arc::clone(&p));
                        p
                    }
                    None => {
                        missing.insert(*address);
                        continue;
                    }
                },
            };
            if let Some(decl) = package.find_struct(module, name) {
                for field in &decl.fields {
                    open_datatypes(&field.signature.body, &mut pending);
                }
            }
        }
        Ok(Closure(loaded))
    }
}

fn concrete_datatypes(sig: &TypeSignature, out: &mut Vec<DatatypeKey>) {
    match sig {
        TypeSignature::Vector(inner) => concrete_datatypes(inner, out),
        TypeSignature::Datatype(d) => {
            out.push((d.package, d.module.clone(), d.name.clone()));
            for arg in &d.type_arguments {
                concrete_datatypes(arg, out);
            }
        }
        _ => {}
    }
}

fn open_datatypes(body: &OpenSignatureBody, out: &mut Vec<DatatypeKey>) {
    match body {
        OpenSignatureBody::Vector(inner) => open_datatypes(inner, out),
        OpenSignatureBody::Datatype(d) => {
            out.push((d.package, d.module.clone(), d.name.clone()));
            for arg in &d.type_arguments {
                open_datatypes(arg, out);
            }
        }
        _ => {}
    }
}

fn rewrite_to_defining(sig: &TypeSignature, packages: &HashMap<Address, Arc<PackageDecl>>) -> ChainqlResult<TypeSignature> {
    Ok(match sig {
        TypeSignature::Vector(inner) => TypeSignature::vector(rewrite_to_defining(inner, packages)?),
        TypeSignature::Datatype(d) => {
            let unknown = || ChainqlError::UnknownType {
                type_name: d.base_repr(),
            };
            let package = packages.get(&d.package).ok_or_else(unknown)?;
            if package.find_struct(&d.module, &d.name).is_none() {
                return Err(unknown());
            }
            let defining = package.defining_id(&d.module, &d.name).unwrap_or(d.package);
            let args = d
                .type_arguments
                .iter()
                .map(|a| rewrite_to_defining(a, packages))
                .collect::<ChainqlResult<Vec<_>>>()?;
            TypeSignature::datatype(defining, &d.module, &d.name, args)
        }
        primitive => primitive.clone(),
    })
}

fn abilities_of(sig: &TypeSignature, closure: &Closure) -> ChainqlResult<AbilitySet> {
    let primitive = || AbilitySet::from_abilities(&[Ability::Copy, Ability::Drop, Ability::Store]);
    match sig {
        TypeSignature::Vector(inner) => Ok(abilities_of(inner, closure)?
            .iter()
            .filter(|a| *a != Ability::Key)
            .collect()),
        TypeSignature::Datatype(d) => {
            let decl = closure
                .find_struct(&d.package, &d.module, &d.name)
                .ok_or_else(|| ChainqlError::UnknownType {
                    type_name: d.base_repr(),
                })?;
            if decl.type_parameters.len() != d.type_arguments.len() {
                return Err(ChainqlError::MalformedSignature {
                    message: format!(
                        "{} expects {} type arguments, found {}",
                        d.base_repr(),
                        decl.type_parameters.len(),
                        d.type_arguments.len()
                    ),
                });
            }
            let mut kept = decl.abilities;
            for (param, arg) in decl.type_parameters.iter().zip(&d.type_arguments) {
                if param.is_phantom {
                    continue;
                }
                let arg_abilities = abilities_of(arg, closure)?;
                kept = kept
                    .iter()
                    .filter(|a| {
                        let required = if *a == Ability::Key { Ability::Store } else { *a };
                        arg_abilities.has(required)
                    })
                    .collect();
            }
            Ok(kept)
        }
        _ => Ok(primitive()),
    }
}
