use std::fmt;

use common::types::{LoopId, NonTouchingGroup};

use crate::groups::NonTouchingGroups;

/// One forward path and its contribution `gain × cofactor` to the numerator.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTerm {
    pub nodes: Vec<String>,
    pub gain: f64,
    /// Δ_i for this path.
    pub cofactor: f64,
    /// Non-touching groups among the loops that do not touch this path.
    pub cofactor_groups: NonTouchingGroups,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopEntry {
    pub id: LoopId,
    pub nodes: Vec<String>,
    pub gain: f64,
}

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub start: String,
    pub end: String,
    pub transfer_function: f64,
    pub delta: f64,
    pub forward_paths: Vec<PathTerm>,
    pub loops: Vec<LoopEntry>,
    pub groups: NonTouchingGroups,
}

impl TransferReport {
    /// Δ_i of every forward path, in path order.
    pub fn cofactors(&self) -> Vec<f64> {
        self.forward_paths.iter().map(|p| p.cofactor).collect()
    }

    pub fn path_gains(&self) -> Vec<f64> {
        self.forward_paths.iter().map(|p| p.gain).collect()
    }
}

fn write_group(f: &mut fmt::Formatter, group: &NonTouchingGroup) -> fmt::Result {
    let members: Vec<String> = group
        .members
        .iter()
        .map(|id| format!("L{}", id.0 + 1))
        .collect();
    writeln!(f, "    {{{}}} gain {}", members.join(", "), group.gain)
}

/// Prints the report; the alternate form (`{:#}`) adds the group breakdown
/// behind every cofactor.
impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Transfer function {} -> {}: {}",
            self.start, self.end, self.transfer_function
        )?;
        writeln!(f, "Delta: {}", self.delta)?;

        writeln!(f, "Forward paths:")?;
        for (i, path) in self.forward_paths.iter().enumerate() {
            writeln!(
                f,
                "  P{}: {} with gain {}, delta_{} = {}",
                i + 1,
                path.nodes.join(" -> "),
                path.gain,
                i + 1,
                path.cofactor
            )?;
            if f.alternate() {
                for (order, groups) in path.cofactor_groups.iter() {
                    writeln!(f, "   order {}:", order)?;
                    for group in groups {
                        write_group(f, group)?;
                    }
                }
            }
        }

        writeln!(f, "Loops:")?;
        if self.loops.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for entry in &self.loops {
            let closing = entry.nodes.first().map_or("", String::as_str);
            writeln!(
                f,
                "  L{}: {} -> {} with gain {}",
                entry.id.0 + 1,
                entry.nodes.join(" -> "),
                closing,
                entry.gain
            )?;
        }

        for (order, groups) in self.groups.iter().filter(|(order, _)| *order > 1) {
            writeln!(f, "Non-touching groups of order {}:", order)?;
            for group in groups {
                write_group(f, group)?;
            }
        }

        Ok(())
    }
}
