//! Primary-avatar normalization.
//!
//! Pure over its input: the transition handlers keep the single-primary
//! invariant in storage, but a listing may still observe a momentarily
//! inconsistent snapshot (concurrent writes, legacy rows). Rather than
//! requiring a consistent read, the listing path repairs what it sees.

use itertools::Itertools;

use crate::domain::models::{AvatarDatum, AvatarKind};

/// Normalize a candidate listing so that at most one entry is primary and
/// that entry sits at index 0, all other entries keeping relative order.
///
/// When several entries claim primary, every claim is cleared and a single
/// winner is re-marked: the gravatar entry if it is among the claimants,
/// otherwise the first claimant in listing order. Also returns whether any
/// uploaded avatar was present in the candidates.
pub fn normalize(mut candidates: Vec<AvatarDatum>) -> (Vec<AvatarDatum>, bool) {
    let has_uploaded_avatar = candidates
        .iter()
        .any(|datum| datum.kind == AvatarKind::Uploaded);

    let claimants = candidates
        .iter()
        .positions(|datum| datum.is_primary)
        .collect_vec();

    if claimants.len() > 1 {
        let gravatar_claim = claimants
            .iter()
            .copied()
            .find(|&idx| candidates[idx].kind == AvatarKind::Gravatar);

        for &idx in &claimants {
            candidates[idx].is_primary = false;
        }

        let winner = gravatar_claim.unwrap_or(claimants[0]);
        candidates[winner].is_primary = true;
    }

    if let Some(primary_idx) = candidates.iter().position(|datum| datum.is_primary) {
        let primary = candidates.remove(primary_idx);
        candidates.insert(0, primary);
    }

    (candidates, has_uploaded_avatar)
}
