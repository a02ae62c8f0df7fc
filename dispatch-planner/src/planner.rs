//! Dispatch Planner (spec §4.4): greedy bin-packing of the fewest GPUs on
//! one node that together cover a VRAM requirement.

use dispatch_types::{InventorySnapshot, Selection};

/// Select a minimal set of GPUs on a single node satisfying `required_mib`.
///
/// Deterministic given the inventory's iteration order (spec §8):
///
/// 1. Nodes are tried in inventory order; the **first** node whose total
///    free memory covers the requirement wins. Remaining nodes are not
///    evaluated.
/// 2. Within that node, GPUs are sorted ascending by free memory (stable;
///    ties break on cuda index) and accumulated greedily until the running
///    total meets the requirement — consuming small GPUs first so large
///    ones stay free for bigger future models.
///
/// Returns `None` if the inventory is empty, `required_mib` is `0`, or no
/// node has enough total free memory. The caller is responsible for
/// treating an unresolvable VRAM estimate as "unknown" and never calling
/// this function with a guessed requirement (spec §4.4).
pub fn select(inventory: &InventorySnapshot, required_mib: u64) -> Option<Selection> {
    if required_mib == 0 {
        return None;
    }

    for node in inventory.nodes() {
        let total_free = node.total_free_mib();
        if total_free < required_mib {
            continue;
        }

        let mut sorted_gpus: Vec<&dispatch_types::Gpu> = node.gpus.iter().collect();
        sorted_gpus.sort_by(|a, b| {
            a.free_memory_mib
                .cmp(&b.free_memory_mib)
                .then(a.cuda_index.cmp(&b.cuda_index))
        });

        let mut picked = Vec::new();
        let mut running = 0u64;
        for gpu in sorted_gpus {
            picked.push(gpu.identity());
            running += gpu.free_memory_mib;
            if running >= required_mib {
                return Some(Selection {
                    node_name: node.node_name.clone(),
                    gpus: picked,
                    total_free_mib: running,
                    required_mib,
                });
            }
        }
        // total_free >= required_mib was already checked, so the loop
        // above always returns before exhausting sorted_gpus.
        unreachable!("node total free covers requirement but no prefix summed to it");
    }

    None
}
