//! Enumeration of variable-modification placements.
//!
//! Patterns come out grouped by how many sites are modified, fewest first,
//! so truncating the stream keeps the least modified isoforms. Within one
//! group, earlier sites take a modification before later ones and the
//! candidates of a site are tried in configuration order.

use super::modification::Modification;
use super::polymer::{
    Anchoring,
    collect_applicable,
};
use super::sequence_view::SeqView;
use super::site::{
    Site,
    SiteModifications,
};
use std::ops::ControlFlow;

/// Reusable scratch holding the eligible variable modifications of one
/// polymer and the choice vector of the enumerator.
#[derive(Debug, Default)]
pub struct PossibleModifications<'a> {
    eligible: SiteModifications<'a>,
    choices: Vec<usize>,
}

/// One placement: for each eligible site, either nothing or one candidate.
#[derive(Debug, Clone, Copy)]
pub struct ModificationPattern<'p, 'a> {
    eligible: &'p SiteModifications<'a>,
    choices: &'p [usize],
}

impl<'p, 'a> ModificationPattern<'p, 'a> {
    /// Modified sites with their modification, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (Site, &'a Modification)> + 'p {
        let eligible = self.eligible;
        eligible
            .sites()
            .iter()
            .zip(self.choices.iter())
            .filter(|(_, choice)| **choice > 0)
            .map(move |(&site, &choice)| (site, eligible.get(site)[choice - 1]))
    }

    pub fn num_modified(&self) -> usize {
        self.choices.iter().filter(|c| **c > 0).count()
    }
}

impl<'a> PossibleModifications<'a> {
    /// Collects which of `candidates` could sit where on `sequence`.
    pub fn collect<I>(&mut self, sequence: SeqView<'_>, anchoring: Anchoring, candidates: I)
    where
        I: IntoIterator<Item = &'a Modification>,
    {
        self.eligible.reset(sequence.len());
        collect_applicable(sequence, anchoring, candidates, &mut self.eligible);
    }

    pub fn eligible(&self) -> &SiteModifications<'a> {
        &self.eligible
    }

    /// Calls `emit` once per placement until it breaks or placements run out.
    ///
    /// With no eligible site the single empty placement is emitted.
    pub fn for_each_pattern<F>(&mut self, mut emit: F) -> ControlFlow<()>
    where
        F: FnMut(ModificationPattern<'_, 'a>) -> ControlFlow<()>,
    {
        let Self { eligible, choices } = self;
        let num_sites = eligible.num_sites();
        choices.clear();
        choices.resize(num_sites, 0);
        if num_sites == 0 {
            return emit(ModificationPattern {
                eligible: &*eligible,
                choices: choices.as_slice(),
            });
        }
        for num_modified in 0..=num_sites {
            enumerate(eligible, choices, 0, num_sites - num_modified, &mut emit)?;
        }
        ControlFlow::Continue(())
    }
}

fn enumerate<'a, F>(
    eligible: &SiteModifications<'a>,
    choices: &mut [usize],
    index: usize,
    unmodified_left: usize,
    emit: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(ModificationPattern<'_, 'a>) -> ControlFlow<()>,
{
    if index == choices.len() {
        return emit(ModificationPattern {
            eligible,
            choices: &*choices,
        });
    }
    let sites_left = choices.len() - index;
    if unmodified_left < sites_left {
        let site = eligible.sites()[index];
        for choice in 1..=eligible.get(site).len() {
            choices[index] = choice;
            enumerate(eligible, choices, index + 1, unmodified_left, emit)?;
        }
    }
    if unmodified_left > 0 {
        choices[index] = 0;
        enumerate(eligible, choices, index + 1, unmodified_left - 1, emit)?;
    }
    ControlFlow::Continue(())
}
