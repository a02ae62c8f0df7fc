//! Profile Synthesizer (spec §4.5): turns a [`Selection`] into the KubeAI
//! `resourceProfile` token.

use dispatch_registry::GpuRegistry;
use dispatch_types::{InventorySnapshot, ResourceProfile, Selection};

use crate::{Error, Result};

/// Derive the `model_token` KubeAI expects from a driver-reported display
/// name, e.g. `NVIDIA GeForce RTX 4090` → `4090`.
///
/// Only `RTX`-branded names are supported (spec §4.5); anything else fails
/// with [`dispatch_types::Error::UnsupportedGpuModel`].
fn rtx_token(display_name: &str) -> dispatch_types::Result<String> {
    let idx = display_name
        .find("RTX")
        .ok_or_else(|| dispatch_types::Error::UnsupportedGpuModel(display_name.to_string()))?;
    let token = display_name[idx + "RTX".len()..].trim().to_lowercase();
    if token.is_empty() {
        return Err(dispatch_types::Error::UnsupportedGpuModel(
            display_name.to_string(),
        ));
    }
    Ok(token)
}

/// Synthesize a [`ResourceProfile`] for a [`Selection`], looking up the
/// selected node's GPUs in `inventory` and their VRAM class in `registry`.
///
/// All GPUs in the selection must share one `display_name` — a mixed-model
/// selection is rejected with [`Error::HeterogeneousSelection`] rather than
/// silently taking one GPU's class, per the resolved homogeneity question.
pub fn synthesize(
    inventory: &InventorySnapshot,
    selection: &Selection,
    registry: &GpuRegistry,
) -> Result<ResourceProfile> {
    let node = inventory
        .nodes()
        .iter()
        .find(|n| n.node_name == selection.node_name)
        .ok_or_else(|| Error::Types(dispatch_types::Error::NoAvailableGpu))?;

    let mut display_names: Vec<&str> = selection
        .gpus
        .iter()
        .filter_map(|identity| {
            node.gpus
                .iter()
                .find(|g| &g.identity() == identity)
                .map(|g| g.name.as_str())
        })
        .collect();
    display_names.dedup();

    if display_names.len() > 1 {
        return Err(Error::Types(dispatch_types::Error::HeterogeneousSelection(
            display_names.into_iter().map(str::to_string).collect(),
        )));
    }
    let display_name = display_names
        .first()
        .copied()
        .ok_or_else(|| Error::Types(dispatch_types::Error::NoAvailableGpu))?;

    let entry = registry.lookup(display_name).ok_or_else(|| {
        Error::Types(dispatch_types::Error::UnsupportedGpuModel(
            display_name.to_string(),
        ))
    })?;
    let model_token = rtx_token(display_name).map_err(Error::Types)?;

    ResourceProfile::new(&model_token, entry.vram_gib, selection.gpu_count())
        .map_err(Error::Types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_types::{Gpu, GpuModelEntry, GpuNode};

    fn gpu(idx: u32, free: u64, name: &str) -> Gpu {
        Gpu {
            node: "node-a".into(),
            cuda_index: idx,
            uuid: format!("GPU-{idx:08x}"),
            name: name.to_string(),
            free_memory_mib: free,
            used_memory_mib: 0,
            util_percent: 0,
            temperature_c: 40,
            power_w: 100,
        }
    }

    fn registry() -> GpuRegistry {
        GpuRegistry::new(vec![GpuModelEntry {
            display_name: "NVIDIA GeForce RTX 4090".into(),
            vram_gib: 24,
        }])
    }

    #[test]
    fn scenario_single_gpu_profile() {
        let mut node = GpuNode::new("node-a");
        node.push(gpu(0, 24000, "NVIDIA GeForce RTX 4090")).unwrap();
        let inventory = InventorySnapshot::new(vec![node]);
        let selection = Selection {
            node_name: "node-a".into(),
            gpus: vec!["cuda:0".into()],
            total_free_mib: 24000,
            required_mib: 5530,
        };

        let profile = synthesize(&inventory, &selection, &registry()).unwrap();
        assert_eq!(profile.as_str(), "nvidia-gpu-4090-24gb:1");
    }

    #[test]
    fn scenario_multi_gpu_profile() {
        let mut node = GpuNode::new("node-b");
        node.push(gpu(0, 4096, "NVIDIA GeForce RTX 4090")).unwrap();
        node.push(gpu(1, 8192, "NVIDIA GeForce RTX 4090")).unwrap();
        let inventory = InventorySnapshot::new(vec![node]);
        let selection = Selection {
            node_name: "node-b".into(),
            gpus: vec!["cuda:0".into(), "cuda:1".into()],
            total_free_mib: 12288,
            required_mib: 5530,
        };

        let profile = synthesize(&inventory, &selection, &registry()).unwrap();
        assert_eq!(profile.as_str(), "nvidia-gpu-4090-24gb:2");
    }

    #[test]
    fn heterogeneous_selection_is_rejected() {
        let mut node = GpuNode::new("node-c");
        node.push(gpu(0, 4096, "NVIDIA GeForce RTX 4090")).unwrap();
        node.push(gpu(1, 8192, "NVIDIA GeForce RTX 3090")).unwrap();
        let inventory = InventorySnapshot::new(vec![node]);
        let selection = Selection {
            node_name: "node-c".into(),
            gpus: vec!["cuda:0".into(), "cuda:1".into()],
            total_free_mib: 12288,
            required_mib: 5530,
        };

        let mut reg = registry();
        reg = GpuRegistry::new(vec![
            GpuModelEntry {
                display_name: "NVIDIA GeForce RTX 4090".into(),
                vram_gib: 24,
            },
            GpuModelEntry {
                display_name: "NVIDIA GeForce RTX 3090".into(),
                vram_gib: 24,
            },
        ]);

        let err = synthesize(&inventory, &selection, &reg).unwrap_err();
        assert!(matches!(
            err,
            Error::Types(dispatch_types::Error::HeterogeneousSelection(_))
        ));
    }

    #[test]
    fn non_rtx_display_name_is_unsupported() {
        let mut node = GpuNode::new("node-d");
        node.push(gpu(0, 24000, "NVIDIA A100")).unwrap();
        let inventory = InventorySnapshot::new(vec![node]);
        let selection = Selection {
            node_name: "node-d".into(),
            gpus: vec!["cuda:0".into()],
            total_free_mib: 24000,
            required_mib: 5530,
        };
        let reg = GpuRegistry::new(vec![GpuModelEntry {
            display_name: "NVIDIA A100".into(),
            vram_gib: 40,
        }]);

        let err = synthesize(&inventory, &selection, &reg).unwrap_err();
        assert!(matches!(
            err,
            Error::Types(dispatch_types::Error::UnsupportedGpuModel(_))
        ));
    }
}
