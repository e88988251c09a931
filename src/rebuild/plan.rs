//! Rebuild planning: decide per XOR set whether reconstruction is
//! possible and emit the repair command for each recoverable loss.

use crate::model::{CheckpointId, CheckpointSet, MemberIndex, RebuildCommand, XorSetId};
use log::{debug, warn};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::path::Path;

/// Plans rebuild commands for one checkpoint set, filling in
/// `build_commands` and `unrecoverable_xor`.
///
/// A member counts as missing when its parity file was never observed
/// or when the rank it protects is itself missing files. One missing
/// member per set is recoverable; two or more are not.
pub fn plan_rebuilds(ckpt_id: CheckpointId, set: &mut CheckpointSet, rebuild_cmd: &Path) {
    let mut commands = Vec::new();
    let mut unrecoverable: BTreeSet<XorSetId> = BTreeSet::new();

    for (&set_id, xor) in &set.xor_sets {
        let members = xor.members_declared;
        if members == 0 {
            warn!("unknown number of members in XOR set {set_id} of checkpoint {ckpt_id}");
            continue;
        }

        // Too few surviving parity files to even attempt the set; its
        // ranks stay missing.
        let surviving = xor.members.len() as u32;
        if surviving + 1 < members {
            debug!(
                "XOR set {set_id} of checkpoint {ckpt_id} has only {surviving} of \
                 {members} members, skipping"
            );
            continue;
        }

        let mut missing: Vec<MemberIndex> = Vec::new();
        for member in 1..=members {
            match xor.members.get(&member) {
                None => missing.push(member),
                Some(observed) => {
                    if set.missing_ranks.contains(&observed.rank_id) {
                        missing.push(member);
                    }
                }
            }
        }

        match missing.as_slice() {
            [] => {}
            [lost] => commands.push(rebuild_command(rebuild_cmd, set, set_id, members, *lost)),
            _ => {
                unrecoverable.insert(set_id);
            }
        }
    }

    set.build_commands = commands;
    set.unrecoverable_xor = unrecoverable;
}

/// Argv for one repair invocation, in final order:
/// binary, member count, zero-based lost slot, lost parity file name,
/// then every surviving parity file name in member order.
fn rebuild_command(
    rebuild_cmd: &Path,
    set: &CheckpointSet,
    set_id: XorSetId,
    members: u32,
    lost: MemberIndex,
) -> RebuildCommand {
    let mut argv: SmallVec<[String; 8]> = SmallVec::new();
    argv.push(rebuild_cmd.to_string_lossy().into_owned());
    argv.push(members.to_string());
    argv.push((lost - 1).to_string());
    argv.push(format!("{lost}_of_{members}_in_{set_id}.xor"));
    for member in (1..=members).filter(|&m| m != lost) {
        if let Some(observed) = set.xor_sets[&set_id].members.get(&member) {
            argv.push(observed.xor_filename.clone());
        }
    }
    RebuildCommand { argv }
}
