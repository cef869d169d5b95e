//! Multi-phase greedy section selection
//!
//! A build runs four phases against one running selection:
//!
//! 1. explicitly requested courses (plus the capstone when asked for)
//! 2. missing core courses in sorted order, each followed by its co-requisites
//! 3. unmet orientation areas, then unmet exploration areas (only while below
//!    the credit floor)
//! 4. best-scoring filler sections until the floor is reached
//!
//! Every per-course outcome lands in the reasons log. Only a result that breaks
//! its own invariants is reported as an error.

use crate::core::conflict::{overlaps, Footprint, TimePolicy};
use crate::core::error::{PlannerError, PlannerResult};
use crate::core::models::course::normalize_code;
use crate::core::models::{Preferences, ScheduleResult, ScheduledSection, Section};
use crate::core::requirements::{AnnotatedCourse, RequirementRules, RequirementsEngine, Tier};
use crate::{debug, info, warn};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Construction-time choices for a [`ScheduleBuilder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    /// How section start/end strings are parsed
    pub time_policy: TimePolicy,
    /// Skip sections with no free seats
    pub respect_capacity: bool,
}

/// Builds one schedule per call from shared rule tables
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    rules: Arc<RequirementRules>,
    options: BuilderOptions,
}

/// A section offered this term with its parsed meeting pattern
#[derive(Debug)]
struct Offering<'s> {
    section: &'s Section,
    footprint: Footprint,
}

/// One (course, section) pair eligible for ranking
#[derive(Debug, Clone, Copy)]
struct Candidate<'c, 'a, 's> {
    course: &'c AnnotatedCourse<'a>,
    offering: &'c Offering<'s>,
}

/// How a single course or area attempt ended
#[derive(Debug, PartialEq, Eq)]
enum Attempt {
    Accepted { code: String, section_id: String },
    NotInCatalog,
    AlreadyScheduled,
    NoSections,
    NoFit,
    OverBudget { code: String, units: u32 },
}

/// Running state of one build call
#[derive(Debug, Default)]
struct Selection {
    chosen: Vec<(ScheduledSection, Footprint)>,
    used: HashSet<String>,
    credits: u32,
    reasons: Vec<String>,
}

impl Selection {
    fn conflicts(&self, footprint: &Footprint) -> bool {
        self.chosen.iter().any(|(_, other)| overlaps(footprint, other))
    }

    fn accept(&mut self, candidate: Candidate<'_, '_, '_>) {
        let course = candidate.course.course;
        self.used.insert(course.course_id.clone());
        self.credits = self.credits.saturating_add(course.units);
        self.chosen.push((
            ScheduledSection::new(course, candidate.offering.section),
            candidate.offering.footprint.clone(),
        ));
    }

    /// Whether `units` more credits stay within `max` (overflow never fits)
    fn fits(&self, units: u32, max: u32) -> bool {
        self.credits.checked_add(units).is_some_and(|total| total <= max)
    }

    fn reason(&mut self, text: String) {
        debug!("{text}");
        self.reasons.push(text);
    }
}

/// Catalog lookups shared by all phases of one build
struct Term<'c, 'a, 's> {
    courses: &'c [AnnotatedCourse<'a>],
    by_code: HashMap<&'c str, Vec<&'c AnnotatedCourse<'a>>>,
    offerings: HashMap<&'s str, Vec<Offering<'s>>>,
    completed: HashSet<String>,
}

impl<'c, 'a, 's> Term<'c, 'a, 's> {
    fn offerings_of(&self, course: &AnnotatedCourse<'_>) -> &[Offering<'s>] {
        self.offerings
            .get(course.course.course_id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sections of `courses` in course order, then section order
    fn candidates<'t, I>(&'t self, courses: I) -> Vec<Candidate<'t, 'a, 's>>
    where
        I: IntoIterator<Item = &'t AnnotatedCourse<'a>>,
        'c: 't,
    {
        courses
            .into_iter()
            .flat_map(|course| {
                self.offerings_of(course)
                    .iter()
                    .map(move |offering| Candidate { course, offering })
            })
            .collect()
    }

    /// Whether a course may be drawn from an open pool (phases 3 and 4)
    fn open_for_pool(&self, course: &AnnotatedCourse<'_>, selection: &Selection) -> bool {
        !selection.used.contains(&course.course.course_id) && !self.completed.contains(&course.key)
    }
}

impl ScheduleBuilder {
    /// Create a builder over shared rule tables
    #[must_use]
    pub const fn new(rules: Arc<RequirementRules>, options: BuilderOptions) -> Self {
        Self { rules, options }
    }

    /// The options fixed at construction
    #[must_use]
    pub const fn options(&self) -> BuilderOptions {
        self.options
    }

    /// Build a schedule for one request
    ///
    /// Infeasible requests are not errors; they show up in `reasons` and the
    /// result may be empty or below the credit floor.
    ///
    /// # Errors
    /// Returns [`PlannerError::InvalidPreferences`] for `min_credits > max_credits`
    /// and [`PlannerError::Internal`] if the finished selection violates its own
    /// invariants (duplicate course, overlapping sections, credit ceiling).
    pub fn build<S: AsRef<str>>(
        &self,
        annotated: &[AnnotatedCourse<'_>],
        sections: &[Section],
        prefs: Preferences,
        completed: &[S],
    ) -> PlannerResult<ScheduleResult> {
        prefs.validate()?;

        let engine = RequirementsEngine::new(Arc::clone(&self.rules));
        let progress = engine.progress(completed, annotated);
        let term = self.index_term(annotated, sections, completed);
        let mut selection = Selection::default();

        if sections.is_empty() {
            selection.reason("No sections are offered this term.".to_string());
        }

        self.must_include_phase(&term, &prefs, &mut selection);
        self.core_phase(&term, &progress.core_missing, &prefs, &mut selection);
        for tier in Tier::ALL {
            if selection.credits < prefs.min_credits {
                let unmet = match tier {
                    Tier::Orientation => &progress.tier_unmet.orientation,
                    Tier::Exploration => &progress.tier_unmet.exploration,
                };
                self.area_phase(&term, tier, unmet, &prefs, &mut selection);
            }
        }
        if selection.credits < prefs.min_credits {
            self.filler_phase(&term, &prefs, &mut selection);
        }
        if selection.credits < prefs.min_credits {
            selection.reason(format!(
                "Scheduled {} credits, below the {}-credit minimum.",
                selection.credits, prefs.min_credits
            ));
        }

        Self::check_invariants(&selection, &prefs)?;
        info!(
            "Built schedule: {} sections, {} credits",
            selection.chosen.len(),
            selection.credits
        );

        Ok(ScheduleResult {
            schedule: selection.chosen.into_iter().map(|(s, _)| s).collect(),
            credits: selection.credits,
            reasons: selection.reasons,
            preferences: prefs,
            progress,
        })
    }

    fn index_term<'c, 'a, 's, S: AsRef<str>>(
        &self,
        annotated: &'c [AnnotatedCourse<'a>],
        sections: &'s [Section],
        completed: &[S],
    ) -> Term<'c, 'a, 's> {
        let mut by_code: HashMap<&str, Vec<&AnnotatedCourse<'a>>> = HashMap::new();
        let mut known_ids = HashSet::new();
        for course in annotated {
            by_code.entry(course.key.as_str()).or_default().push(course);
            known_ids.insert(course.course.course_id.as_str());
        }

        let mut offerings: HashMap<&str, Vec<Offering<'s>>> = HashMap::new();
        for section in sections {
            if !known_ids.contains(section.course_id.as_str()) {
                warn!(
                    "Section {} references unknown course id '{}', skipping",
                    section.section_id, section.course_id
                );
                continue;
            }
            offerings
                .entry(section.course_id.as_str())
                .or_default()
                .push(Offering {
                    section,
                    footprint: Footprint::of(section, self.options.time_policy),
                });
        }

        Term {
            courses: annotated,
            by_code,
            offerings,
            completed: completed
                .iter()
                .map(|c| normalize_code(c.as_ref()))
                .collect(),
        }
    }

    /// Hard constraints; a failing section is never scored
    fn admissible(&self, offering: &Offering<'_>, prefs: &Preferences, selection: &Selection) -> bool {
        let fp = &offering.footprint;
        if !fp.days.is_disjoint(&prefs.avoid_days) {
            return false;
        }
        if let Some(earliest) = prefs.earliest_start {
            if !fp.start.is_some_and(|start| start >= earliest.minutes()) {
                return false;
            }
        }
        if let Some(latest) = prefs.latest_end {
            if !fp.end.is_some_and(|end| end <= latest.minutes()) {
                return false;
            }
        }
        if self.options.respect_capacity && offering.section.is_full() {
            return false;
        }
        !selection.conflicts(fp)
    }

    /// Soft ranking: +2 for a preferred day (or no preference), +1 for a late enough start
    fn score(footprint: &Footprint, prefs: &Preferences) -> u8 {
        let mut score = 0;
        if prefs.preferred_days.is_empty() || !footprint.days.is_disjoint(&prefs.preferred_days) {
            score += 2;
        }
        if let Some(earliest) = prefs.earliest_start {
            if footprint.start.is_some_and(|start| start >= earliest.minutes()) {
                score += 1;
            }
        }
        score
    }

    /// Filter, rank and try to accept the best of `pool`
    fn pick_best(
        &self,
        pool: Vec<Candidate<'_, '_, '_>>,
        prefs: &Preferences,
        selection: &mut Selection,
    ) -> Attempt {
        if pool.is_empty() {
            return Attempt::NoSections;
        }
        let mut eligible: Vec<_> = pool
            .into_iter()
            .filter(|c| !selection.used.contains(&c.course.course.course_id))
            .filter(|c| self.admissible(c.offering, prefs, selection))
            .collect();
        // stable: equal scores keep enumeration order
        eligible.sort_by_key(|c| std::cmp::Reverse(Self::score(&c.offering.footprint, prefs)));

        let Some(best) = eligible.first().copied() else {
            return Attempt::NoFit;
        };
        let course = best.course.course;
        if !selection.fits(course.units, prefs.max_credits) {
            return Attempt::OverBudget {
                code: course.code.clone(),
                units: course.units,
            };
        }
        debug!(
            "Accepting {} section {} (score {})",
            course.code,
            best.offering.section.section_id,
            Self::score(&best.offering.footprint, prefs)
        );
        selection.accept(best);
        Attempt::Accepted {
            code: course.code.clone(),
            section_id: best.offering.section.section_id.clone(),
        }
    }

    /// Select/accept procedure for one course code
    fn pick_course(
        &self,
        term: &Term<'_, '_, '_>,
        code: &str,
        prefs: &Preferences,
        selection: &mut Selection,
    ) -> Attempt {
        let Some(courses) = term.by_code.get(normalize_code(code).as_str()) else {
            return Attempt::NotInCatalog;
        };
        if courses
            .iter()
            .all(|c| selection.used.contains(&c.course.course_id))
        {
            return Attempt::AlreadyScheduled;
        }
        let pool = term.candidates(courses.iter().copied());
        self.pick_best(pool, prefs, selection)
    }

    fn must_include_phase(&self, term: &Term<'_, '_, '_>, prefs: &Preferences, selection: &mut Selection) {
        let mut wanted: BTreeSet<String> =
            prefs.must_include.iter().map(|c| normalize_code(c)).collect();
        if prefs.include_capstone {
            match &self.rules.core.capstone {
                Some(capstone) => {
                    wanted.insert(capstone.clone());
                }
                None => selection.reason("No capstone course is defined.".to_string()),
            }
        }
        info!("Phase 1: {} requested course(s)", wanted.len());

        for code in &wanted {
            let text = match self.pick_course(term, code, prefs, selection) {
                Attempt::Accepted { section_id, .. } => {
                    format!("Included requested {code} ({section_id}).")
                }
                Attempt::NotInCatalog => format!("Requested {code} is not in the course table."),
                Attempt::AlreadyScheduled => format!("Requested {code} is already scheduled."),
                Attempt::NoSections | Attempt::NoFit => {
                    format!("No section fits for requested {code}.")
                }
                Attempt::OverBudget { units, .. } => format!(
                    "Skipped requested {code}: {units} more credits would exceed {}.",
                    prefs.max_credits
                ),
            };
            selection.reason(text);
        }
    }

    fn core_phase(
        &self,
        term: &Term<'_, '_, '_>,
        missing: &[String],
        prefs: &Preferences,
        selection: &mut Selection,
    ) {
        let core = &self.rules.core;
        let label = if core.name.is_empty() { "core" } else { core.name.as_str() };
        info!("Phase 2: {} missing {label} course(s)", missing.len());

        for code in missing {
            if selection.credits >= prefs.max_credits {
                info!("Phase 2 stopped at the credit ceiling");
                break;
            }
            let accepted = match self.pick_course(term, code, prefs, selection) {
                Attempt::Accepted { section_id, .. } => {
                    selection.reason(format!("Added {label}: {code} ({section_id})."));
                    true
                }
                Attempt::AlreadyScheduled => {
                    selection.reason(format!("{label} {code} is already scheduled."));
                    false
                }
                Attempt::NotInCatalog | Attempt::NoSections | Attempt::NoFit => {
                    selection.reason(format!("No available section for {label} {code}."));
                    false
                }
                Attempt::OverBudget { units, .. } => {
                    selection.reason(format!(
                        "Skipped {label} {code}: {units} more credits would exceed {}.",
                        prefs.max_credits
                    ));
                    false
                }
            };
            if !accepted {
                continue;
            }

            for coreq in core.corequisites_of(code) {
                let text = match self.pick_course(term, coreq, prefs, selection) {
                    Attempt::Accepted { section_id, .. } => {
                        format!("Added co-requisite: {coreq} ({section_id}).")
                    }
                    Attempt::AlreadyScheduled => {
                        format!("Co-requisite {coreq} is already scheduled.")
                    }
                    Attempt::NotInCatalog | Attempt::NoSections | Attempt::NoFit => {
                        format!("No section fits for co-requisite {coreq} of {code}.")
                    }
                    Attempt::OverBudget { units, .. } => format!(
                        "Skipped co-requisite {coreq}: {units} more credits would exceed {}.",
                        prefs.max_credits
                    ),
                };
                selection.reason(text);
            }
        }
    }

    fn area_phase(
        &self,
        term: &Term<'_, '_, '_>,
        tier: Tier,
        unmet: &[String],
        prefs: &Preferences,
        selection: &mut Selection,
    ) {
        info!("Phase 3: {} unmet {tier} area(s)", unmet.len());

        for area in unmet {
            if selection.credits >= prefs.max_credits {
                info!("Phase 3 stopped at the credit ceiling");
                break;
            }
            let tagged: Vec<&AnnotatedCourse<'_>> = term
                .courses
                .iter()
                .filter(|c| c.has_area(tier, area) && term.open_for_pool(c, selection))
                .collect();
            if tagged.is_empty() {
                selection.reason(format!("No course found for {tier}: {area}."));
                continue;
            }

            let pool = term.candidates(tagged);
            let text = match self.pick_best(pool, prefs, selection) {
                Attempt::Accepted { code, section_id } => {
                    format!("Added {tier} area {area}: {code} ({section_id}).")
                }
                Attempt::NoSections => format!("No section offered for {tier}: {area}."),
                Attempt::NoFit | Attempt::AlreadyScheduled | Attempt::NotInCatalog => {
                    format!("All sections conflict for {tier}: {area}.")
                }
                Attempt::OverBudget { code, units } => format!(
                    "Skipped {tier} area {area}: {code} adds {units} credits, over {}.",
                    prefs.max_credits
                ),
            };
            selection.reason(text);
        }
    }

    fn filler_phase(&self, term: &Term<'_, '_, '_>, prefs: &Preferences, selection: &mut Selection) {
        let pool: Vec<Candidate<'_, '_, '_>> = term
            .candidates(
                term.courses
                    .iter()
                    .filter(|c| c.course.units > 0 && term.open_for_pool(c, selection)),
            )
            .into_iter()
            .filter(|c| self.admissible(c.offering, prefs, selection))
            .collect();
        info!("Phase 4: {} filler candidate(s)", pool.len());

        let mut ranked = pool;
        ranked.sort_by_key(|c| std::cmp::Reverse(Self::score(&c.offering.footprint, prefs)));

        for candidate in ranked {
            let course = candidate.course.course;
            if selection.used.contains(&course.course_id)
                || !selection.fits(course.units, prefs.max_credits)
                || !self.admissible(candidate.offering, prefs, selection)
            {
                continue;
            }
            selection.accept(candidate);
            selection.reason(format!(
                "Added good-fit filler: {} ({}).",
                course.code, candidate.offering.section.section_id
            ));
            if selection.credits >= prefs.min_credits {
                break;
            }
        }
    }

    fn check_invariants(selection: &Selection, prefs: &Preferences) -> PlannerResult<()> {
        let mut seen = HashSet::new();
        for (scheduled, _) in &selection.chosen {
            if !seen.insert(scheduled.course_id.as_str()) {
                return Err(PlannerError::Internal(format!(
                    "course {} selected twice",
                    scheduled.course_id
                )));
            }
        }
        for (i, (a, fa)) in selection.chosen.iter().enumerate() {
            if let Some((b, _)) = selection.chosen[i + 1..]
                .iter()
                .find(|(_, fb)| overlaps(fa, fb))
            {
                return Err(PlannerError::Internal(format!(
                    "sections {} and {} overlap",
                    a.section_id, b.section_id
                )));
            }
        }
        let total = selection
            .chosen
            .iter()
            .try_fold(0u32, |acc, (s, _)| acc.checked_add(s.units));
        if total != Some(selection.credits) || selection.credits > prefs.max_credits {
            return Err(PlannerError::Internal(format!(
                "credit total {total:?} (tracked {}) against a ceiling of {}",
                selection.credits, prefs.max_credits
            )));
        }
        Ok(())
    }
}
