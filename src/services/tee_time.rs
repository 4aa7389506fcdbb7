//! Tee-time assignment service
//!
//! Places participants into capacity-bounded tee times. Single assignments
//! run inside a transaction that locks the tee time row, so two operators
//! can't both take the last seat. Bulk and whole-itinerary assignment plan
//! against an in-memory occupancy counter, then execute each placement
//! independently and report per-step failures; partial success is kept.

use std::collections::{BTreeMap, HashMap, HashSet};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use crate::database::{DatabaseService, ParticipantRepository, TeeTimeRepository};
use crate::models::participant::{Participant, CreateParticipantRequest};
use crate::models::tee_time::{TeeTime, TeeTimeSlot, TeeTimeDay, CreateTeeTimeRequest, Placement, AssignmentFailure, AssignmentReport};
use crate::utils::errors::{TourDeskError, Result};
use crate::utils::helpers::format_date;
use crate::utils::logging::log_assignment;

/// Reject when the slot has no room left
pub fn check_capacity(tee_time: &TeeTime, occupancy: i64) -> Result<()> {
    if occupancy >= tee_time.max_players as i64 {
        return Err(TourDeskError::CapacityExceeded {
            tee_time_id: tee_time.id,
            max_players: tee_time.max_players,
        });
    }
    Ok(())
}

/// Which of `candidates` fit into `tee_time`, in order
///
/// `already_assigned` holds participants that sit in the slot already; they
/// are accepted without consuming another seat.
pub fn plan_bulk(
    tee_time: &TeeTime,
    occupancy: i64,
    candidates: &[i64],
    already_assigned: &HashSet<i64>,
) -> (Vec<i64>, Vec<AssignmentFailure>) {
    let mut taken = occupancy;
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    let mut failures = Vec::new();

    for &participant_id in candidates {
        if !seen.insert(participant_id) || already_assigned.contains(&participant_id) {
            continue;
        }
        match check_capacity(tee_time, taken) {
            Ok(()) => {
                taken += 1;
                accepted.push(participant_id);
            }
            Err(e) => failures.push(AssignmentFailure {
                participant_id: Some(participant_id),
                play_date: Some(tee_time.play_date),
                reason: e.to_string(),
            }),
        }
    }

    (accepted, failures)
}

/// One placement of a whole-itinerary plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryStep {
    pub play_date: NaiveDate,
    pub tee_time_id: i64,
    /// false for the original participant row, true for an inserted copy
    pub clone: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItineraryPlan {
    pub steps: Vec<ItineraryStep>,
    pub failures: Vec<AssignmentFailure>,
}

/// Plan one placement per play date for `participant`
///
/// Dates are visited in ascending order and the earliest slot with room is
/// taken. The first placed date keeps the original row; later dates get
/// clones. Dates listed in `covered` already have a row for this person and
/// are skipped.
pub fn plan_itinerary(
    participant: &Participant,
    tee_times: &[TeeTime],
    occupancy: &HashMap<i64, i64>,
    covered: &HashSet<NaiveDate>,
) -> ItineraryPlan {
    let mut counters = occupancy.clone();
    if let Some(current) = participant.tee_time_id {
        if let Some(count) = counters.get_mut(&current) {
            *count = (*count - 1).max(0);
        }
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<&TeeTime>> = BTreeMap::new();
    for tee_time in tee_times.iter().filter(|t| t.tour_id == participant.tour_id) {
        by_date.entry(tee_time.play_date).or_default().push(tee_time);
    }

    let mut plan = ItineraryPlan::default();
    for (date, mut slots) in by_date {
        if covered.contains(&date) {
            debug!(participant_id = participant.id, date = %date, "Date already covered, skipping");
            continue;
        }
        slots.sort_by_key(|t| (t.tee_time, t.id));

        let pick = slots.into_iter().find(|t| {
            let taken = counters.get(&t.id).copied().unwrap_or(0);
            check_capacity(t, taken).is_ok()
        });

        match pick {
            Some(tee_time) => {
                *counters.entry(tee_time.id).or_insert(0) += 1;
                let original_placed = plan.steps.iter().any(|s| !s.clone);
                plan.steps.push(ItineraryStep {
                    play_date: date,
                    tee_time_id: tee_time.id,
                    clone: original_placed,
                });
            }
            None => plan.failures.push(AssignmentFailure {
                participant_id: Some(participant.id),
                play_date: Some(date),
                reason: format!("{} 배정 가능한 티타임이 없습니다", format_date(date)),
            }),
        }
    }

    plan
}

/// Group tee times by date with their occupancy and assigned names
pub fn build_days(tee_times: Vec<TeeTime>, participants: &[Participant]) -> Vec<TeeTimeDay> {
    let mut names: HashMap<i64, Vec<String>> = HashMap::new();
    for p in participants {
        if let Some(tee_time_id) = p.tee_time_id {
            names.entry(tee_time_id).or_default().push(p.name.clone());
        }
    }

    let mut days: BTreeMap<NaiveDate, Vec<TeeTimeSlot>> = BTreeMap::new();
    for tee_time in tee_times {
        let participants = names.remove(&tee_time.id).unwrap_or_default();
        let occupancy = participants.len() as i64;
        let remaining = (tee_time.max_players as i64 - occupancy).max(0);
        days.entry(tee_time.play_date).or_default().push(TeeTimeSlot {
            tee_time,
            occupancy,
            remaining,
            participants,
        });
    }

    days.into_iter()
        .map(|(play_date, mut slots)| {
            slots.sort_by_key(|s| (s.tee_time.tee_time, s.tee_time.id));
            TeeTimeDay { play_date, slots }
        })
        .collect()
}

/// Tee-time service
#[derive(Debug, Clone)]
pub struct TeeTimeService {
    db: DatabaseService,
}

impl TeeTimeService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Create a tee time for a tour
    pub async fn create(&self, request: CreateTeeTimeRequest) -> Result<TeeTime> {
        request.validate()?;
        let tour = self.db.tours.find_by_id(request.tour_id).await?
            .ok_or(TourDeskError::TourNotFound { tour_id: request.tour_id })?;

        if !tour.includes(request.play_date) {
            return Err(TourDeskError::InvalidInput(format!(
                "Play date {} is outside the tour ({} ~ {})",
                request.play_date, tour.start_date, tour.end_date
            )));
        }

        let tee_time = self.db.tee_times.create(request).await?;
        info!(tee_time_id = tee_time.id, tour_id = tee_time.tour_id, "Tee time created");
        Ok(tee_time)
    }

    /// Delete a tee time
    pub async fn delete(&self, tee_time_id: i64) -> Result<()> {
        if !self.db.tee_times.delete(tee_time_id).await? {
            return Err(TourDeskError::TeeTimeNotFound { tee_time_id });
        }
        Ok(())
    }

    /// Slots of a tour grouped by play date
    pub async fn days(&self, tour_id: i64) -> Result<Vec<TeeTimeDay>> {
        let tee_times = self.db.tee_times.list_by_tour(tour_id).await?;
        let participants = self.db.participants.list_by_tour(tour_id).await?;
        Ok(build_days(tee_times, &participants))
    }

    /// Assign one participant, rejecting when the slot is full
    pub async fn assign(&self, participant_id: i64, tee_time_id: i64) -> Result<Participant> {
        let mut tx = self.db.begin().await?;

        let tee_time = TeeTimeRepository::lock(&mut tx, tee_time_id).await?;
        let participant = ParticipantRepository::lock(&mut tx, participant_id).await?;

        if participant.tour_id != tee_time.tour_id {
            return Err(TourDeskError::InvalidInput(format!(
                "Participant {} does not belong to the tour of tee time {}",
                participant_id, tee_time_id
            )));
        }

        if participant.tee_time_id == Some(tee_time_id) {
            tx.commit().await?;
            return Ok(participant);
        }

        let occupancy = ParticipantRepository::count_by_tee_time(&mut tx, tee_time_id).await?;
        if let Err(e) = check_capacity(&tee_time, occupancy) {
            log_assignment(tee_time_id, participant_id, false, Some("capacity"));
            return Err(e);
        }

        let updated = ParticipantRepository::set_tee_time(&mut tx, participant_id, Some(tee_time_id)).await?;
        tx.commit().await?;

        log_assignment(tee_time_id, participant_id, true, None);
        Ok(updated)
    }

    /// Remove a participant from their tee time
    pub async fn unassign(&self, participant_id: i64) -> Result<Participant> {
        let mut tx = self.db.begin().await?;
        let updated = ParticipantRepository::set_tee_time(&mut tx, participant_id, None).await?;
        tx.commit().await?;

        debug!(participant_id = participant_id, "Participant unassigned from tee time");
        Ok(updated)
    }

    /// Assign several participants to one slot, collecting failures
    pub async fn bulk_assign(&self, tee_time_id: i64, participant_ids: &[i64]) -> Result<AssignmentReport> {
        let tee_time = self.db.tee_times.find_by_id(tee_time_id).await?
            .ok_or(TourDeskError::TeeTimeNotFound { tee_time_id })?;
        let roster = self.db.participants.list_by_tour(tee_time.tour_id).await?;

        let occupancy = roster.iter().filter(|p| p.tee_time_id == Some(tee_time_id)).count() as i64;
        let already: HashSet<i64> = roster.iter()
            .filter(|p| p.tee_time_id == Some(tee_time_id))
            .map(|p| p.id)
            .collect();

        let (accepted, mut failures) = plan_bulk(&tee_time, occupancy, participant_ids, &already);

        let mut report = AssignmentReport::default();
        for participant_id in accepted {
            match self.assign(participant_id, tee_time_id).await {
                Ok(_) => report.assigned.push(Placement {
                    participant_id,
                    tee_time_id,
                    play_date: tee_time.play_date,
                    cloned: false,
                }),
                Err(e) => {
                    warn!(participant_id = participant_id, tee_time_id = tee_time_id, error = %e, "Bulk assignment step failed");
                    failures.push(AssignmentFailure {
                        participant_id: Some(participant_id),
                        play_date: Some(tee_time.play_date),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.failures = failures;

        info!(tee_time_id = tee_time_id, summary = %report.summary(), "Bulk assignment finished");
        Ok(report)
    }

    /// Place a participant on every play date of the tour
    pub async fn assign_itinerary(&self, participant_id: i64) -> Result<AssignmentReport> {
        let participant = self.db.participants.find_by_id(participant_id).await?
            .ok_or(TourDeskError::ParticipantNotFound { participant_id })?;

        let tee_times = self.db.tee_times.list_by_tour(participant.tour_id).await?;
        if tee_times.is_empty() {
            return Err(TourDeskError::InvalidInput("No tee times registered for this tour".to_string()));
        }

        let occupancy: HashMap<i64, i64> = self.db.tee_times
            .occupancy_by_tour(participant.tour_id)
            .await?
            .into_iter()
            .collect();

        let roster = self.db.participants.list_by_tour(participant.tour_id).await?;
        let covered = covered_dates(&participant, &roster, &tee_times);

        let plan = plan_itinerary(&participant, &tee_times, &occupancy, &covered);
        let mut report = AssignmentReport {
            assigned: Vec::new(),
            failures: plan.failures,
        };

        for step in plan.steps {
            let outcome = if step.clone {
                self.insert_clone(&participant, &step).await
            } else {
                self.assign(participant.id, step.tee_time_id).await
            };

            match outcome {
                Ok(row) => report.assigned.push(Placement {
                    participant_id: row.id,
                    tee_time_id: step.tee_time_id,
                    play_date: step.play_date,
                    cloned: step.clone,
                }),
                Err(e) => {
                    warn!(participant_id = participant.id, date = %step.play_date, error = %e, "Itinerary step failed");
                    report.failures.push(AssignmentFailure {
                        participant_id: Some(participant.id),
                        play_date: Some(step.play_date),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.failures.sort_by_key(|f| f.play_date);
        info!(participant_id = participant.id, summary = %report.summary(), "Itinerary assignment finished");
        Ok(report)
    }

    async fn insert_clone(&self, source: &Participant, step: &ItineraryStep) -> Result<Participant> {
        let mut tx = self.db.begin().await?;

        let tee_time = TeeTimeRepository::lock(&mut tx, step.tee_time_id).await?;
        let occupancy = ParticipantRepository::count_by_tee_time(&mut tx, tee_time.id).await?;
        check_capacity(&tee_time, occupancy)?;

        let note = format!("{} 일정 배정 (원본 #{})", format_date(step.play_date), source.id);
        let request = CreateParticipantRequest::cloned_from(source, note, tee_time.id);
        let clone = ParticipantRepository::insert(&mut tx, request).await?;
        tx.commit().await?;

        log_assignment(tee_time.id, clone.id, true, None);
        Ok(clone)
    }
}

/// Dates on which another row for the same person already holds a slot
fn covered_dates(participant: &Participant, roster: &[Participant], tee_times: &[TeeTime]) -> HashSet<NaiveDate> {
    let dates: HashMap<i64, NaiveDate> = tee_times.iter().map(|t| (t.id, t.play_date)).collect();
    let key = participant.identity_key();

    roster.iter()
        .filter(|p| p.id != participant.id && p.identity_key() == key)
        .filter_map(|p| p.tee_time_id.and_then(|id| dates.get(&id).copied()))
        .collect()
}
