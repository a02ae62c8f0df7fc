//! GPU Inventory Builder (spec §4.2): joins a [`TelemetryBundle`] into an
//! [`InventorySnapshot`].

use std::collections::HashMap;

use dispatch_clients::TelemetryBundle;
use dispatch_types::{Gpu, GpuNode, InventorySnapshot};

use crate::{Error, Result};

const METRIC_FIELDS: [(&str, &str); 5] = [
    ("DCGM_FI_DEV_FB_FREE", "free_memory_mib"),
    ("DCGM_FI_DEV_FB_USED", "used_memory_mib"),
    ("DCGM_FI_DEV_GPU_TEMP", "temperature_c"),
    ("DCGM_FI_DEV_GPU_UTIL", "util_percent"),
    ("DCGM_FI_DEV_POWER_USAGE", "power_w"),
];

#[derive(Default)]
struct PartialGpu {
    uuid: String,
    name: String,
    free_memory_mib: Option<u64>,
    used_memory_mib: Option<u64>,
    util_percent: Option<u32>,
    temperature_c: Option<u32>,
    power_w: Option<u32>,
}

impl PartialGpu {
    fn into_gpu(self, node: &str, cuda_index: u32) -> Result<Gpu> {
        Ok(Gpu {
            node: node.to_string(),
            cuda_index,
            uuid: self.uuid,
            name: self.name,
            free_memory_mib: self
                .free_memory_mib
                .ok_or_else(|| Error::incomplete(node, cuda_index, "free_memory_mib"))?,
            used_memory_mib: self
                .used_memory_mib
                .ok_or_else(|| Error::incomplete(node, cuda_index, "used_memory_mib"))?,
            util_percent: self
                .util_percent
                .ok_or_else(|| Error::incomplete(node, cuda_index, "util_percent"))?,
            temperature_c: self
                .temperature_c
                .ok_or_else(|| Error::incomplete(node, cuda_index, "temperature_c"))?,
            power_w: self
                .power_w
                .ok_or_else(|| Error::incomplete(node, cuda_index, "power_w"))?,
        })
    }
}

/// Build an [`InventorySnapshot`] from a raw telemetry bundle.
///
/// Nodes keep first-seen order; GPUs within a node are ordered by cuda
/// index. Every scalar is truncated via `floor()` before storage. A GPU
/// missing any of the five metrics fails the whole build with
/// [`Error::Incomplete`] (spec §4.2 invariant).
pub fn build_inventory(bundle: &TelemetryBundle) -> Result<InventorySnapshot> {
    let mut node_order: Vec<String> = Vec::new();
    let mut nodes: HashMap<String, HashMap<u32, PartialGpu>> = HashMap::new();

    for (metric, samples) in &bundle.results {
        let field = METRIC_FIELDS
            .iter()
            .find(|(m, _)| m == metric)
            .map(|(_, f)| *f)
            .unwrap_or(metric);

        for sample in samples {
            if !nodes.contains_key(&sample.node) {
                node_order.push(sample.node.clone());
            }
            let gpu = nodes
                .entry(sample.node.clone())
                .or_default()
                .entry(sample.gpu_index)
                .or_default();
            gpu.uuid = sample.uuid.clone();
            gpu.name = sample.model_name.clone();

            let truncated = sample.value.floor();
            match field {
                "free_memory_mib" => gpu.free_memory_mib = Some(truncated as u64),
                "used_memory_mib" => gpu.used_memory_mib = Some(truncated as u64),
                "util_percent" => gpu.util_percent = Some(truncated as u32),
                "temperature_c" => gpu.temperature_c = Some(truncated as u32),
                "power_w" => gpu.power_w = Some(truncated as u32),
                _ => {}
            }
        }
    }

    let mut gpu_nodes = Vec::with_capacity(node_order.len());
    for node_name in node_order {
        let mut partials = nodes.remove(&node_name).expect("node was just recorded");
        let mut cuda_indices: Vec<u32> = partials.keys().copied().collect();
        cuda_indices.sort_unstable();

        let mut node = GpuNode::new(node_name.clone());
        for cuda_index in cuda_indices {
            let partial = partials
                .remove(&cuda_index)
                .expect("cuda index was just collected from this map");
            let gpu = partial.into_gpu(&node_name, cuda_index)?;
            node.push(gpu).map_err(Error::Types)?;
        }
        gpu_nodes.push(node);
    }

    Ok(InventorySnapshot::new(gpu_nodes))
}
