//! Wire structs for every tree file layout and their conversion.
//!
//! # Responsibility
//! - Mirror the JSON layout of tree files with serde structs.
//! - Decode a parsed document into graph parts, branching per field on the
//!   stored schema version.
//! - Encode a graph into the current layout.
//!
//! # Invariants
//! - Decoding never touches caller state; it only builds new values.
//! - Empty strings stand for absent optional text, dates and images.
//! - Encoding always produces the current layout.

use super::date_token::{format_date_token, parse_date_token};
use super::version::{current_version, SchemaVersion, CANVAS_STATE_SINCE, RELATIONS_SINCE};
use super::{CodecError, CodecResult};
use crate::graph::FamilyGraph;
use crate::model::date::PartialDate;
use crate::model::member::{Gender, Member, MemberData, MemberId};
use crate::model::union::{Union, UnionData};
use crate::model::view::{CardState, ViewState};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Top-level tree file object.
///
/// Every layout shares this struct; which optional sections must be present
/// depends on `version`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TreeDocument {
    #[serde(rename = "_comment", default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default)]
    pub version: i64,
    pub global_id: u64,
    pub name: String,
    pub members: Vec<MemberRecord>,
    /// Union list before `RELATIONS_SINCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weddings: Option<Vec<WeddingRecord>>,
    /// Union list since `RELATIONS_SINCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationRecord>>,
    /// Card view-state since `CANVAS_STATE_SINCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_state: Option<CanvasStateRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MemberRecord {
    pub id: u64,
    /// Family name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub use_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub other_names: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub birth_location: String,
    #[serde(default)]
    pub death_date: String,
    #[serde(default)]
    pub death_location: String,
    /// Optional before `CANVAS_STATE_SINCE`, required after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,
    #[serde(default)]
    pub comment: String,
    /// Base64 image bytes.
    #[serde(default)]
    pub image: String,
    /// Card position, stored per member before `CANVAS_STATE_SINCE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WeddingRecord {
    pub spouse1: u64,
    pub spouse2: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    pub children: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RelationRecord {
    pub partner1: u64,
    pub partner2: u64,
    /// `"wedding"` for formal unions, empty otherwise.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    /// Written instead of `has_ended` when the end date is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_ended: Option<bool>,
    pub children: Vec<u64>,
    /// Child id (as a string key) to adoption date token.
    #[serde(default)]
    pub adoptions: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CanvasStateRecord {
    pub cards: Vec<CardRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CardRecord {
    pub id: u64,
    pub position: PositionRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct PositionRecord {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct SizeRecord {
    pub w: u32,
    pub h: u32,
}

const WEDDING_KIND: &str = "wedding";

impl TreeDocument {
    /// Builds the current-layout document for a graph and its view-state.
    pub(crate) fn encode(graph: &FamilyGraph, view: &ViewState) -> Self {
        let version = current_version();
        Self {
            comment: format!(
                "Tree file written with schema v{version}. Editing it by hand may corrupt it."
            ),
            version: i64::from(version.raw() as i32),
            global_id: graph.next_id(),
            name: graph.name().to_string(),
            members: graph.members().map(encode_member).collect(),
            weddings: None,
            relations: Some(graph.unions().map(encode_relation).collect()),
            canvas_state: Some(CanvasStateRecord {
                cards: view
                    .iter()
                    .map(|(id, card)| CardRecord {
                        id: id.0,
                        position: PositionRecord {
                            x: card.x,
                            y: card.y,
                        },
                        size: card.size.map(|size| SizeRecord {
                            w: size.w,
                            h: size.h,
                        }),
                    })
                    .collect(),
            }),
        }
    }

    /// Rebuilds the graph and view-state stored in this document.
    ///
    /// `version` selects which sections and fields are required.
    pub(crate) fn decode(self, version: SchemaVersion) -> CodecResult<(FamilyGraph, ViewState)> {
        let positions_in_members = version < CANVAS_STATE_SINCE;
        let mut view = ViewState::new();
        let mut members = Vec::with_capacity(self.members.len());

        for record in self.members {
            let id = MemberId(record.id);
            if positions_in_members {
                let position = record.position.ok_or_else(|| {
                    corrupt(format!("member {id}: missing position"))
                })?;
                view.insert(id, CardState::at(position.x, position.y));
            }
            members.push((id, decode_member(record, version)?));
        }

        let unions = if version < RELATIONS_SINCE {
            self.weddings
                .ok_or_else(|| corrupt("missing `weddings` section"))?
                .into_iter()
                .map(decode_wedding)
                .collect::<CodecResult<Vec<_>>>()?
        } else {
            self.relations
                .ok_or_else(|| corrupt("missing `relations` section"))?
                .into_iter()
                .map(decode_relation)
                .collect::<CodecResult<Vec<_>>>()?
        };

        if !positions_in_members {
            let canvas = self
                .canvas_state
                .ok_or_else(|| corrupt("missing `canvas_state` section"))?;
            for card in canvas.cards {
                let mut state = CardState::at(card.position.x, card.position.y);
                if let Some(size) = card.size {
                    state = state.with_size(size.w, size.h);
                }
                view.insert(MemberId(card.id), state);
            }
        }

        let graph = FamilyGraph::from_parts(self.name, self.global_id, members, unions)
            .map_err(|err| corrupt(err.to_string()))?;
        view.retain(|id, _| graph.member(*id).is_some());
        Ok((graph, view))
    }
}

fn encode_member(member: &Member) -> MemberRecord {
    let data = member.data();
    MemberRecord {
        id: member.id().0,
        name: text(&data.family_name),
        use_name: text(&data.use_name),
        first_name: text(&data.first_name),
        other_names: text(&data.other_names),
        gender: data.gender.code().to_string(),
        birth_date: format_date_token(data.birth_date.as_ref()),
        birth_location: text(&data.birth_location),
        death_date: format_date_token(data.death_date.as_ref()),
        death_location: text(&data.death_location),
        dead: Some(data.dead),
        comment: text(&data.comment),
        image: data
            .image
            .as_deref()
            .map(|bytes| BASE64.encode(bytes))
            .unwrap_or_default(),
        position: None,
    }
}

fn encode_relation(union: &Union) -> RelationRecord {
    let data = union.data();
    let (end_date, has_ended) = match data.end_date.as_ref() {
        Some(end) => (Some(format_date_token(Some(end))), None),
        None => (None, Some(data.ended)),
    };
    RelationRecord {
        partner1: union.partner1().0,
        partner2: union.partner2().0,
        kind: if data.is_formal_union {
            WEDDING_KIND.to_string()
        } else {
            String::new()
        },
        date: format_date_token(data.date.as_ref()),
        location: text(&data.location),
        end_date,
        has_ended,
        children: data.children.iter().map(|id| id.0).collect(),
        adoptions: data
            .adoptions
            .iter()
            .map(|(id, date)| (id.0.to_string(), format_date_token(date.as_ref())))
            .collect(),
    }
}

fn decode_member(record: MemberRecord, version: SchemaVersion) -> CodecResult<MemberData> {
    let id = record.id;
    let gender = Gender::from_code(&record.gender)
        .ok_or_else(|| corrupt(format!("member {id}: unknown gender code `{}`", record.gender)))?;
    let dead = match record.dead {
        Some(dead) => dead,
        None if version < CANVAS_STATE_SINCE => false,
        None => return Err(corrupt(format!("member {id}: missing `dead` flag"))),
    };
    let image = if record.image.is_empty() {
        None
    } else {
        let bytes = BASE64
            .decode(record.image.as_bytes())
            .map_err(|err| corrupt(format!("member {id}: invalid image data: {err}")))?;
        Some(bytes)
    };

    Ok(MemberData {
        family_name: optional(record.name),
        use_name: optional(record.use_name),
        first_name: optional(record.first_name),
        other_names: optional(record.other_names),
        gender,
        birth_date: date(&record.birth_date, || format!("member {id} birth date"))?,
        birth_location: optional(record.birth_location),
        death_date: date(&record.death_date, || format!("member {id} death date"))?,
        death_location: optional(record.death_location),
        dead,
        comment: optional(record.comment),
        image,
    })
}

fn decode_wedding(record: WeddingRecord) -> CodecResult<(MemberId, MemberId, UnionData)> {
    let label = || format!("wedding {}-{}", record.spouse1, record.spouse2);
    let data = UnionData {
        is_formal_union: true,
        date: date(&record.date, label)?,
        location: optional(record.location.clone()),
        children: record.children.iter().copied().map(MemberId).collect(),
        ..UnionData::default()
    };
    Ok((MemberId(record.spouse1), MemberId(record.spouse2), data))
}

fn decode_relation(record: RelationRecord) -> CodecResult<(MemberId, MemberId, UnionData)> {
    let label = format!("relation {}-{}", record.partner1, record.partner2);
    let end_date = match record.end_date.as_deref() {
        Some(token) => date(token, || format!("{label} end date"))?,
        None => None,
    };
    let ended = match (end_date, record.has_ended) {
        (Some(_), _) => true,
        (None, Some(ended)) => ended,
        (None, None) => return Err(corrupt(format!("{label}: missing `has_ended` flag"))),
    };

    let children: BTreeSet<MemberId> = record.children.iter().copied().map(MemberId).collect();
    let mut adoptions = BTreeMap::new();
    for (key, token) in &record.adoptions {
        let child = key
            .parse::<u64>()
            .map(MemberId)
            .map_err(|_| corrupt(format!("{label}: non-numeric adoption key `{key}`")))?;
        let adopted_on = date(token, || format!("{label} adoption date"))?;
        adoptions.insert(child, adopted_on);
    }

    let data = UnionData {
        is_formal_union: record.kind.eq_ignore_ascii_case(WEDDING_KIND),
        date: date(&record.date, || format!("{label} date"))?,
        location: optional(record.location),
        end_date,
        ended,
        children,
        adoptions,
    };
    Ok((MemberId(record.partner1), MemberId(record.partner2), data))
}

fn date(token: &str, context: impl FnOnce() -> String) -> CodecResult<Option<PartialDate>> {
    parse_date_token(token).map_err(|reason| corrupt(format!("{}: {reason}", context())))
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn corrupt(message: impl Into<String>) -> CodecError {
    CodecError::CorruptFile(message.into())
}

#[cfg(test)]
mod tests {
    use super::{RelationRecord, TreeDocument};
    use crate::codec::version::current_version;
    use crate::graph::FamilyGraph;
    use crate::model::member::{Gender, MemberData};
    use crate::model::union::UnionData;
    use crate::model::view::ViewState;

    #[test]
    fn encode_writes_end_date_or_has_ended() {
        let mut graph = FamilyGraph::new("flags");
        let a = graph.add_member(MemberData::default());
        let b = graph.add_member(MemberData::default());
        graph
            .add_union(
                a,
                b,
                UnionData {
                    ended: true,
                    ..UnionData::default()
                },
            )
            .unwrap();

        let document = TreeDocument::encode(&graph, &ViewState::new());
        let relations: &[RelationRecord] = document.relations.as_deref().unwrap();
        assert_eq!(relations[0].has_ended, Some(true));
        assert_eq!(relations[0].end_date, None);
        assert_eq!(relations[0].kind, "");
    }

    #[test]
    fn encode_uses_current_version_and_codes() {
        let mut graph = FamilyGraph::new("codes");
        graph.add_member(MemberData {
            gender: Gender::Woman,
            ..MemberData::default()
        });

        let document = TreeDocument::encode(&graph, &ViewState::new());
        assert_eq!(document.version, i64::from(current_version().raw() as i32));
        assert_eq!(document.members[0].gender, "F");
        assert_eq!(document.members[0].dead, Some(false));
        assert!(document.members[0].position.is_none());
        assert!(document.weddings.is_none());
    }
}
