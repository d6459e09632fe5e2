//! Import pipeline: streams RF2 files into the Component Store.
//!
//! Per spec.md §5's producer/consumer model, each RF2 file is read by one
//! producer (the CSV parser, on the calling thread) that hands batches off
//! over an [`std::sync::mpsc`] channel to a pool of consumer workers
//! (`std::thread::scope`, one pool per component kind, sized to
//! [`std::thread::available_parallelism`]) that write the batch through
//! [`ComponentStore::put`]. After every file has drained, the Index Layer
//! and Search Indexer are rebuilt from the freshly populated store.

use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use snomed_kv::KvStore;
use snomed_search::SearchIndex;
use snomed_store::{index as store_index, ComponentStore, StoredComponent};
use snomed_types::{
    Rf2Concept, Rf2ConcreteRelationship, Rf2Description, Rf2OwlExpression, Rf2Relationship,
};

use snomed_store::ReferenceSetItem;
use snomed_types::{
    Rf2AssociationRefsetMember, Rf2ComplexMapMember, Rf2LanguageRefsetMember, Rf2SimpleMapMember,
    Rf2SimpleRefsetMember,
};

use crate::concrete_relationship::ConcreteRelationshipConfig;
use crate::mrcm::MrcmStore;
use crate::parser::{Rf2Parser, Rf2Record};
use crate::types::{DescriptionConfig, Rf2Config, Rf2Error, Rf2Files, Rf2Result, RelationshipConfig};

/// Per-kind parsing configuration for a full release import.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// Configuration for the concept file.
    pub concept: Rf2Config,
    /// Configuration for the description file.
    pub description: DescriptionConfig,
    /// Configuration for the inferred relationship file.
    pub relationship: RelationshipConfig,
    /// Configuration for the stated relationship file, when present.
    pub stated_relationship: RelationshipConfig,
    /// Configuration for the concrete relationship file, when present.
    pub concrete_relationship: ConcreteRelationshipConfig,
    /// Configuration for refset member files (simple/language/association/maps).
    pub refset: Rf2Config,
    /// Configuration for OWL expression refset files.
    pub owl_expression: Rf2Config,
    /// Number of consumer workers per component kind. `None` defaults to
    /// [`std::thread::available_parallelism`].
    pub workers: Option<usize>,
}

/// Row counts written to the Component Store by [`import_release`].
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Concepts written.
    pub concepts: usize,
    /// Descriptions written.
    pub descriptions: usize,
    /// Inferred relationships written.
    pub relationships: usize,
    /// Stated relationships written.
    pub stated_relationships: usize,
    /// Concrete relationships written.
    pub concrete_relationships: usize,
    /// Reference set members written, across every refset kind.
    pub refset_members: usize,
    /// OWL axiom/ontology reference set members written.
    pub owl_expressions: usize,
}

fn worker_count(config: &ImportConfig) -> usize {
    config
        .workers
        .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
        .max(1)
}

/// Streams a single RF2 file of record type `T` into the Component Store,
/// via one producer (this thread, doing the CSV parse) and `workers`
/// consumer threads that call [`ComponentStore::put`].
fn sink_file<T, S>(
    path: &Path,
    config: Rf2Config,
    store: &ComponentStore<S>,
    workers: usize,
) -> Rf2Result<usize>
where
    T: Rf2Record + StoredComponent + Send + 'static,
    S: KvStore,
{
    let (tx, rx) = mpsc::channel::<Vec<T>>();
    let rx = Arc::new(Mutex::new(rx));

    thread::scope(|scope| -> Rf2Result<usize> {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = Arc::clone(&rx);
                scope.spawn(move || -> Rf2Result<usize> {
                    let mut written = 0;
                    loop {
                        let batch = {
                            let rx = rx.lock().expect("sink worker mutex poisoned");
                            rx.recv()
                        };
                        match batch {
                            Ok(batch) => {
                                written += batch.len();
                                store
                                    .put(&batch)
                                    .map_err(|e| Rf2Error::Parse(format!("store write failed: {e}")))?;
                            }
                            Err(_) => return Ok(written),
                        }
                    }
                })
            })
            .collect();

        let parser = Rf2Parser::<_, T>::from_path(path, config)?;
        parser.parse_batched(|batch| {
            tx.send(batch)
                .map_err(|_| Rf2Error::Parse("import consumer pool closed early".to_string()))
        })?;
        drop(tx);

        let mut total = 0;
        for handle in handles {
            total += handle.join().map_err(|_| {
                Rf2Error::Parse("import consumer worker panicked".to_string())
            })??;
        }
        Ok(total)
    })
}

/// Streams a single refset member file into the Component Store, wrapping
/// each parsed row in the [`snomed_store::ReferenceSetItem`] enum before
/// it reaches the worker pool.
fn sink_refset_file<T, S>(
    path: &Path,
    config: Rf2Config,
    store: &ComponentStore<S>,
    workers: usize,
    wrap: fn(T) -> ReferenceSetItem,
) -> Rf2Result<usize>
where
    T: Rf2Record + Send + 'static,
    S: KvStore,
{
    let (tx, rx) = mpsc::channel::<Vec<ReferenceSetItem>>();
    let rx = Arc::new(Mutex::new(rx));

    thread::scope(|scope| -> Rf2Result<usize> {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = Arc::clone(&rx);
                scope.spawn(move || -> Rf2Result<usize> {
                    let mut written = 0;
                    loop {
                        let batch = {
                            let rx = rx.lock().expect("sink worker mutex poisoned");
                            rx.recv()
                        };
                        match batch {
                            Ok(batch) => {
                                written += batch.len();
                                store
                                    .put(&batch)
                                    .map_err(|e| Rf2Error::Parse(format!("store write failed: {e}")))?;
                            }
                            Err(_) => return Ok(written),
                        }
                    }
                })
            })
            .collect();

        let parser = Rf2Parser::<_, T>::from_path(path, config)?;
        parser.parse_batched(|batch| {
            let wrapped: Vec<_> = batch.into_iter().map(wrap).collect();
            tx.send(wrapped)
                .map_err(|_| Rf2Error::Parse("import consumer pool closed early".to_string()))
        })?;
        drop(tx);

        let mut total = 0;
        for handle in handles {
            total += handle.join().map_err(|_| {
                Rf2Error::Parse("import consumer worker panicked".to_string())
            })??;
        }
        Ok(total)
    })
}

/// Imports a discovered RF2 release into `store`, then rebuilds the Index
/// Layer and `search_index` from the freshly populated store. Returns row
/// counts plus the separately-modeled MRCM store (not Component-Store
/// backed; see `snomed-loader::mrcm`).
pub fn import_release<S: KvStore>(
    files: &Rf2Files,
    config: &ImportConfig,
    store: &ComponentStore<S>,
    search_index: &SearchIndex,
) -> Rf2Result<(ImportReport, MrcmStore)> {
    let workers = worker_count(config);
    let mut report = ImportReport::default();

    if let Some(path) = &files.concept_file {
        report.concepts = sink_file::<Rf2Concept, S>(path, config.concept.clone(), store, workers)?;
    }
    if let Some(path) = &files.description_file {
        report.descriptions =
            sink_file::<Rf2Description, S>(path, config.description.base.clone(), store, workers)?;
    }
    if let Some(path) = &files.relationship_file {
        report.relationships =
            sink_file::<Rf2Relationship, S>(path, config.relationship.base.clone(), store, workers)?;
    }
    if let Some(path) = &files.stated_relationship_file {
        report.stated_relationships = sink_file::<Rf2Relationship, S>(
            path,
            config.stated_relationship.base.clone(),
            store,
            workers,
        )?;
    }
    if let Some(path) = &files.concrete_relationship_file {
        report.concrete_relationships = sink_file::<Rf2ConcreteRelationship, S>(
            path,
            config.concrete_relationship.base.clone(),
            store,
            workers,
        )?;
    }

    for path in &files.simple_refset_files {
        report.refset_members += sink_refset_file::<Rf2SimpleRefsetMember, S>(
            path,
            config.refset.clone(),
            store,
            workers,
            ReferenceSetItem::Simple,
        )?;
    }
    for path in &files.language_refset_files {
        report.refset_members += sink_refset_file::<Rf2LanguageRefsetMember, S>(
            path,
            config.refset.clone(),
            store,
            workers,
            ReferenceSetItem::Language,
        )?;
    }
    for path in &files.association_refset_files {
        report.refset_members += sink_refset_file::<Rf2AssociationRefsetMember, S>(
            path,
            config.refset.clone(),
            store,
            workers,
            ReferenceSetItem::Association,
        )?;
    }
    for path in &files.simple_map_refset_files {
        report.refset_members += sink_refset_file::<Rf2SimpleMapMember, S>(
            path,
            config.refset.clone(),
            store,
            workers,
            ReferenceSetItem::SimpleMap,
        )?;
    }
    for path in &files.complex_map_refset_files {
        report.refset_members += sink_refset_file::<Rf2ComplexMapMember, S>(
            path,
            config.refset.clone(),
            store,
            workers,
            ReferenceSetItem::ComplexMap,
        )?;
    }
    for path in &files.owl_expression_files {
        report.owl_expressions +=
            sink_file::<Rf2OwlExpression, S>(path, config.owl_expression.clone(), store, workers)?;
    }

    let mrcm = MrcmStore::from_files(files).unwrap_or_default();

    store_index::rebuild_all(store).map_err(|e| Rf2Error::Parse(format!("index rebuild failed: {e}")))?;
    search_index
        .rebuild_index(store)
        .map_err(|e| Rf2Error::Parse(format!("search index rebuild failed: {e}")))?;

    Ok((report, mrcm))
}
