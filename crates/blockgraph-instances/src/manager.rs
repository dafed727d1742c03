//! Per-host entry point for the instance engines.

use crate::bake::{bake_instances, AppIdMap};
use crate::host::InstanceHost;
use crate::options::{BakeOptions, UnpackOptions};
use crate::purge::purge_instances;
use crate::unpack::unpack_selection;
use blockgraph_core::{
    BakeResult, CancellationToken, InstanceComponent, InstanceError, ProgressSink, Result,
    UnpackResult,
};
use tracing::instrument;

/// Unpacks, bakes and purges instance graphs for one host document.
///
/// The manager borrows the document mutably for its whole life, so one
/// document is never baked by two managers at once.
pub struct InstanceObjectsManager<'h, H: InstanceHost> {
    host: &'h mut H,
    unpack_options: UnpackOptions,
    bake_options: BakeOptions,
    cancel: CancellationToken,
}

impl<'h, H: InstanceHost> InstanceObjectsManager<'h, H> {
    /// Create a manager with default options.
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            unpack_options: UnpackOptions::default(),
            bake_options: BakeOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the unpack options.
    pub fn with_unpack_options(mut self, options: UnpackOptions) -> Self {
        self.unpack_options = options;
        self
    }

    /// Set the bake options.
    pub fn with_bake_options(mut self, options: BakeOptions) -> Self {
        self.bake_options = options;
        self
    }

    /// Observe `token` between top-level items.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The managed document.
    pub fn host(&self) -> &H {
        self.host
    }

    /// The managed document, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        self.host
    }

    /// Split a selection into atomic objects and the instance graph.
    #[instrument(skip_all, fields(selected = selection.len()))]
    pub fn unpack_selection(&self, selection: &[H::Object]) -> Result<UnpackResult<H::Object>> {
        if selection.is_empty() {
            return Err(InstanceError::InvalidInput(
                "nothing selected to unpack".to_string(),
            ));
        }
        unpack_selection(&*self.host, selection, &self.unpack_options, &self.cancel)
    }

    /// Realize a received instance graph in the document.
    #[instrument(skip_all, fields(components = components.len(), base_layer = base_layer_name))]
    pub fn bake_instances(
        &mut self,
        components: &[(Vec<String>, InstanceComponent)],
        app_id_map: &mut AppIdMap,
        base_layer_name: &str,
        progress: &dyn ProgressSink,
    ) -> Result<BakeResult> {
        bake_instances(
            &mut *self.host,
            components,
            app_id_map,
            base_layer_name,
            &self.bake_options,
            progress,
            &self.cancel,
        )
    }

    /// Delete the definitions an earlier receive baked under `base_layer_name`.
    #[instrument(skip(self))]
    pub fn purge_instances(&mut self, base_layer_name: &str) -> Result<Vec<String>> {
        purge_instances(&mut *self.host, base_layer_name)
    }
}
