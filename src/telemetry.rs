//! Turns the per-frame combat event stream into per-turn threat statistics.
//!
//! `TurnTelemetry` is the turn-scoped ledger: it is filled while the engine
//! replays the previous turn's frames, read by the planning steps, and
//! cleared by the caller once the turn is submitted. It never touches the
//! structure registry beyond membership checks.

use crate::error::FrameError;
use crate::location::*;
use crate::registry::StructureRegistry;
use crate::unit::*;
use fnv::FnvHashMap;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AttackEvent {
    pub attacker_cell: Location,
    pub target_cell: Location,
    pub damage: f32,
    pub attacker_kind: UnitKind,
    pub attacker_side: Side,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeathEvent {
    pub cell: Location,
    pub kind: UnitKind,
    pub side: Side,
    /// The owner removed the unit voluntarily (salvage).
    pub removed_by_owner: bool,
}

/// A mobile unit reaching the edge it was heading for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreachEvent {
    pub cell: Location,
    pub damage: f32,
    pub kind: UnitKind,
    pub side: Side,
}

/// Events of a single action frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameEvents {
    pub attacks: Vec<AttackEvent>,
    pub deaths: Vec<DeathEvent>,
    pub breaches: Vec<BreachEvent>,
}

impl FrameEvents {
    /// Decode an action frame as emitted by the engine:
    ///
    /// ```json
    /// {"events": {
    ///     "attack": [[[ax, ay], [tx, ty], damage, unit_tag, "id", "id", player], ...],
    ///     "death":  [[[x, y], unit_tag, "id", player, removed_by_owner], ...],
    ///     "breach": [[[x, y], damage, unit_tag, "id", player], ...]
    /// }}
    /// ```
    pub fn from_json(frame: &str) -> Result<FrameEvents, FrameError> {
        let root: Value = serde_json::from_str(frame)?;
        let events = &root["events"];

        let attacks = parse_list(&events["attack"], "attack", |entry| {
            Ok(AttackEvent {
                attacker_cell: entry.cell(0)?,
                target_cell: entry.cell(1)?,
                damage: entry.number(2)?,
                attacker_kind: entry.unit(3)?,
                attacker_side: entry.side(6)?,
            })
        })?;

        let deaths = parse_list(&events["death"], "death", |entry| {
            Ok(DeathEvent {
                cell: entry.cell(0)?,
                kind: entry.unit(1)?,
                side: entry.side(3)?,
                removed_by_owner: entry.flag(4)?,
            })
        })?;

        let breaches = parse_list(&events["breach"], "breach", |entry| {
            Ok(BreachEvent {
                cell: entry.cell(0)?,
                damage: entry.number(1)?,
                kind: entry.unit(2)?,
                side: entry.side(4)?,
            })
        })?;

        Ok(FrameEvents {
            attacks,
            deaths,
            breaches,
        })
    }
}

struct RawEntry<'a> {
    event: &'static str,
    index: usize,
    fields: &'a [Value],
}

impl RawEntry<'_> {
    fn malformed(&self, reason: impl Into<String>) -> FrameError {
        FrameError::Malformed {
            event: self.event,
            index: self.index,
            reason: reason.into(),
        }
    }

    fn field(&self, i: usize) -> Result<&Value, FrameError> {
        self.fields
            .get(i)
            .ok_or_else(|| self.malformed(format!("missing field {}", i)))
    }

    fn integer(&self, i: usize) -> Result<u64, FrameError> {
        self.field(i)?
            .as_u64()
            .ok_or_else(|| self.malformed(format!("field {} is not an unsigned integer", i)))
    }

    fn number(&self, i: usize) -> Result<f32, FrameError> {
        self.field(i)?
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| self.malformed(format!("field {} is not a number", i)))
    }

    fn flag(&self, i: usize) -> Result<bool, FrameError> {
        let value = self.field(i)?;
        value
            .as_bool()
            .or_else(|| value.as_u64().map(|v| v != 0))
            .ok_or_else(|| self.malformed(format!("field {} is not a flag", i)))
    }

    fn cell(&self, i: usize) -> Result<Location, FrameError> {
        let coords = self
            .field(i)?
            .as_array()
            .filter(|c| c.len() == 2)
            .ok_or_else(|| self.malformed(format!("field {} is not a coordinate pair", i)))?;
        let x = coords[0].as_i64().unwrap_or(-1);
        let y = coords[1].as_i64().unwrap_or(-1);
        Location::checked(x as i32, y as i32)
            .ok_or_else(|| self.malformed(format!("coordinate [{}, {}] out of range", x, y)))
    }

    fn unit(&self, i: usize) -> Result<UnitKind, FrameError> {
        let tag = self.integer(i)?;
        u8::try_from(tag)
            .ok()
            .and_then(UnitKind::from_tag)
            .ok_or(FrameError::UnknownUnitTag(tag))
    }

    fn side(&self, i: usize) -> Result<Side, FrameError> {
        let tag = self.integer(i)?;
        u8::try_from(tag)
            .ok()
            .and_then(Side::from_player_tag)
            .ok_or(FrameError::UnknownPlayerTag(tag))
    }
}

fn parse_list<T, F>(list: &Value, event: &'static str, parse: F) -> Result<Vec<T>, FrameError>
where
    F: Fn(&RawEntry) -> Result<T, FrameError>,
{
    let entries = match list {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        _ => {
            return Err(FrameError::Malformed {
                event,
                index: 0,
                reason: "event list is not an array".to_string(),
            })
        }
    };

    let mut parsed = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let fields = entry.as_array().ok_or(FrameError::Malformed {
            event,
            index,
            reason: "event is not an array".to_string(),
        })?;
        match parse(&RawEntry {
            event,
            index,
            fields,
        }) {
            Ok(value) => parsed.push(value),
            Err(err @ (FrameError::UnknownUnitTag(_) | FrameError::UnknownPlayerTag(_))) => {
                warn!("Telemetry: skipping {} event {}: {}", event, index, err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(parsed)
}

/// Opponent activity against one of our structures during one turn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatStat {
    pub demolishers_seen: u32,
    pub scouts_seen: u32,
    pub damage_dealt: f32,
}

impl ThreatStat {
    fn record(&mut self, attack: &AttackEvent) {
        self.damage_dealt += attack.damage;
        match attack.attacker_kind {
            UnitKind::Mobile(MobileKind::Demolisher) => self.demolishers_seen += 1,
            UnitKind::Mobile(MobileKind::Scout) => self.scouts_seen += 1,
            _ => {}
        }
    }
}

/// A structure lost to the opponent, with the threat that killed it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub cell: Location,
    pub kind: StructureKind,
    pub attacker: Option<Location>,
    pub threat: Option<ThreatStat>,
    /// Set once attacker/threat have been captured; they never change after.
    captured: bool,
}

impl DeathRecord {
    pub fn new(cell: Location, kind: StructureKind) -> Self {
        DeathRecord {
            cell,
            kind,
            attacker: None,
            threat: None,
            captured: false,
        }
    }

    /// A record whose threat is already known, e.g. restored from a
    /// previous turn.
    pub fn captured(
        cell: Location,
        kind: StructureKind,
        attacker: Option<Location>,
        threat: Option<ThreatStat>,
    ) -> Self {
        DeathRecord {
            cell,
            kind,
            attacker,
            threat,
            captured: true,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }
}

/// Hits from one attacker cell against one target cell.
#[derive(Copy, Clone, Debug)]
struct Engagement {
    attacker: Location,
    hits: u32,
    damage: f32,
}

/// Turn-scoped threat ledger.
#[derive(Clone, Debug, Default)]
pub struct TurnTelemetry {
    threats: FnvHashMap<Location, ThreatStat>,
    /// Per target cell, attackers in the order they were first seen.
    engagements: FnvHashMap<Location, Vec<Engagement>>,
    deaths: Vec<DeathRecord>,
    breaches: Vec<BreachEvent>,
    frames: u32,
}

impl TurnTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the ledger. Attacks count only when an opponent
    /// unit hits a cell holding one of our registered structures; deaths
    /// count only for our structures lost to the opponent.
    pub fn ingest(&mut self, frame: &FrameEvents, registry: &StructureRegistry) {
        self.frames += 1;

        for attack in &frame.attacks {
            if attack.attacker_side != Side::Enemy || !registry.contains(attack.target_cell) {
                continue;
            }

            self.threats
                .entry(attack.target_cell)
                .or_default()
                .record(attack);

            let engagements = self.engagements.entry(attack.target_cell).or_default();
            match engagements
                .iter_mut()
                .find(|e| e.attacker == attack.attacker_cell)
            {
                Some(engagement) => {
                    engagement.hits += 1;
                    engagement.damage += attack.damage;
                }
                None => engagements.push(Engagement {
                    attacker: attack.attacker_cell,
                    hits: 1,
                    damage: attack.damage,
                }),
            }
        }

        for death in &frame.deaths {
            if death.side != Side::Friendly || death.removed_by_owner {
                continue;
            }
            let kind = match death.kind.structure() {
                Some(kind) => kind,
                None => continue,
            };
            if self.deaths.iter().any(|d| d.cell == death.cell) {
                continue;
            }
            info!("Telemetry: lost {:?} at {}", kind, death.cell);
            self.deaths.push(DeathRecord::new(death.cell, kind));
        }

        for breach in &frame.breaches {
            if breach.side == Side::Enemy {
                debug!("Telemetry: breached at {} for {}", breach.cell, breach.damage);
            }
            self.breaches.push(*breach);
        }
    }

    pub fn threat_at(&self, cell: Location) -> Option<&ThreatStat> {
        self.threats.get(&cell)
    }

    pub fn threats(&self) -> impl Iterator<Item = (Location, &ThreatStat)> + '_ {
        self.threats.iter().map(|(cell, stat)| (*cell, stat))
    }

    /// Largest cumulative damage any single cell took this turn, 0 if none.
    pub fn max_damage(&self) -> f32 {
        self.threats
            .values()
            .map(|s| s.damage_dealt)
            .fold(0.0, f32::max)
    }

    /// The attacker cell with the most hits on `target`; ties go to the
    /// first seen.
    pub fn strongest_attacker(&self, target: Location) -> Option<Location> {
        let engagements = self.engagements.get(&target)?;
        let mut best: Option<&Engagement> = None;
        for engagement in engagements {
            if best.map_or(true, |current| engagement.hits > current.hits) {
                best = Some(engagement);
            }
        }
        best.map(|e| e.attacker)
    }

    /// Capture the attacker and threat for a death record. Records that were
    /// already captured are left untouched.
    pub fn attach_threat(&self, record: &mut DeathRecord) {
        if record.captured {
            return;
        }
        record.attacker = self.strongest_attacker(record.cell);
        record.threat = self.threat_at(record.cell).copied();
        record.captured = true;

        if record.attacker.is_none() {
            debug!(
                "Telemetry: no attacker recorded for lost {:?} at {}",
                record.kind, record.cell
            );
        }
    }

    pub fn deaths(&self) -> &[DeathRecord] {
        &self.deaths
    }

    /// Hand the turn's new death records to the caller, threats attached.
    pub fn take_deaths(&mut self) -> Vec<DeathRecord> {
        let mut deaths = std::mem::take(&mut self.deaths);
        for record in deaths.iter_mut() {
            self.attach_threat(record);
        }
        deaths
    }

    pub fn breaches(&self) -> &[BreachEvent] {
        &self.breaches
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.threats.is_empty() && self.deaths.is_empty() && self.breaches.is_empty()
    }

    pub fn clear(&mut self) {
        self.threats.clear();
        self.engagements.clear();
        self.deaths.clear();
        self.breaches.clear();
        self.frames = 0;
    }
}
