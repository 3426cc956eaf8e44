//! The format catalog: every known tile, color and palette definition plus
//! the hardware profiles that bind them together, loaded from JSON.

use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};
use serde::Deserialize;

use crate::{
    common::{BitAddr, Rgb},
    error::GfxError,
    gfxdef::{ChrDef, ColDef, GfxDef, GfxProfile, PalDef, RgbLayout},
};

const BUILTIN_GFXDEFS: &str = include_str!("../gfxdefs.json");

/// An offset table, either spelled out or as an arithmetic run.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOffsets {
    List(Vec<BitAddr>),
    Run { start: BitAddr, step: BitAddr, count: u32 },
}

impl RawOffsets {
    /// A run never yields more than one entry past `expected`, which is
    /// enough for the length check in [`ChrDef::new`] to reject it.
    fn into_vec(self, expected: usize) -> Vec<BitAddr> {
        match self {
            RawOffsets::List(v) => v,
            RawOffsets::Run { start, step, count } => itertools::iterate(start, |a| a.saturating_add(step))
                .take((count as usize).min(expected + 1))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawChrDef {
    id: String,
    width: u16,
    height: u16,
    bitplanes: u8,
    planeoffset: RawOffsets,
    pixeloffset: RawOffsets,
    rowoffset: RawOffsets,
}

#[derive(Deserialize)]
struct RawRgbLayout {
    red: (i8, u8),
    green: (i8, u8),
    blue: (i8, u8),
}

#[derive(Deserialize)]
struct RawColDef {
    id: String,
    #[serde(default)]
    big_endian: bool,
    layout: Option<Vec<RawRgbLayout>>,
    refpal: Option<Vec<[u8; 3]>>,
}

#[derive(Deserialize)]
struct RawPalDef {
    id: String,
    entry_datasize: u8,
    subpal_length: u16,
    subpal_count: u16,
    subpal_datasize: Option<u32>,
}

#[derive(Deserialize)]
struct RawProfile {
    id: String,
    chrdef: String,
    coldef: String,
    paldef: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawGfxDefs {
    chrdefs: Vec<RawChrDef>,
    coldefs: Vec<RawColDef>,
    paldefs: Vec<RawPalDef>,
    profiles: Vec<RawProfile>,
}

impl RawChrDef {
    fn build(self) -> Result<ChrDef, GfxError> {
        ChrDef::new(
            &self.id,
            self.width,
            self.height,
            self.bitplanes,
            self.planeoffset.into_vec(self.bitplanes as usize),
            self.pixeloffset.into_vec(self.width as usize),
            self.rowoffset.into_vec(self.height as usize),
        )
    }
}

impl RawColDef {
    fn build(self) -> Result<ColDef, GfxError> {
        match (self.layout, self.refpal) {
            (Some(layout), None) => {
                let passes = layout
                    .into_iter()
                    .map(|p| RgbLayout::new(p.red, p.green, p.blue))
                    .collect();
                ColDef::with_layout(&self.id, passes, self.big_endian)
            }
            (None, Some(refpal)) => {
                ColDef::with_refpal(&self.id, refpal.into_iter().map(Rgb::from).collect(), self.big_endian)
            }
            _ => Err(GfxError::invalid(
                "coldef",
                &self.id,
                "exactly one of 'layout' or 'refpal' must be given",
            )),
        }
    }
}

impl RawPalDef {
    fn build(self) -> Result<PalDef, GfxError> {
        PalDef::new(
            &self.id,
            self.entry_datasize,
            self.subpal_length,
            self.subpal_count,
            self.subpal_datasize,
        )
    }
}

/// Ids picked for a conversion. Explicit ids win over the profile's.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefSelection {
    pub profile: Option<String>,
    pub chrdef: Option<String>,
    pub coldef: Option<String>,
    pub paldef: Option<String>,
}

/// The three definitions a conversion runs with.
#[derive(Copy, Clone, Debug)]
pub struct ResolvedDefs<'a> {
    pub chrdef: &'a ChrDef,
    pub coldef: &'a ColDef,
    pub paldef: &'a PalDef,
}

#[derive(Clone, Debug, Default)]
pub struct GfxDefs {
    chrdefs: HashMap<String, ChrDef>,
    coldefs: HashMap<String, ColDef>,
    paldefs: HashMap<String, PalDef>,
    profiles: HashMap<String, GfxProfile>,
}

fn insert_def<T: GfxDef>(kind: &str, map: &mut HashMap<String, T>, def: T) {
    let id = def.id().to_string();
    if map.insert(id.clone(), def).is_some() {
        warn!("Duplicate {kind} '{id}' replaces the earlier definition");
    }
}

fn lookup<'a, T>(kind: &'static str, map: &'a HashMap<String, T>, id: &str) -> Result<&'a T, GfxError> {
    map.get(id).ok_or_else(|| GfxError::DefinitionNotFound {
        kind,
        id: id.to_string(),
        available: sorted_ids(map).join(", "),
    })
}

fn pick<'a>(kind: &'static str, explicit: Option<&'a str>, from_profile: Option<&'a str>) -> Result<&'a str, GfxError> {
    explicit.or(from_profile).ok_or(GfxError::NoDefinitionSelected { kind })
}

fn sorted_ids<T>(map: &HashMap<String, T>) -> Vec<&str> {
    map.keys().map(String::as_str).sorted_unstable().collect()
}

impl GfxDefs {
    /// Parses and validates a catalog. Profiles must only refer to
    /// definitions present in the same catalog.
    pub fn from_json(json: &str) -> Result<Self, GfxError> {
        let raw: RawGfxDefs = serde_json::from_str(json)?;
        let mut defs = GfxDefs::default();
        for chrdef in raw.chrdefs {
            defs.add_chrdef(chrdef.build()?);
        }
        for coldef in raw.coldefs {
            defs.add_coldef(coldef.build()?);
        }
        for paldef in raw.paldefs {
            defs.add_paldef(paldef.build()?);
        }
        for p in raw.profiles {
            let profile = GfxProfile::new(&p.id, &p.chrdef, &p.coldef, &p.paldef);
            defs.check_profile(&profile)?;
            defs.add_profile(profile);
        }
        info!(
            "Loaded {} chrdefs, {} coldefs, {} paldefs, {} profiles",
            defs.chrdefs.len(),
            defs.coldefs.len(),
            defs.paldefs.len(),
            defs.profiles.len()
        );
        Ok(defs)
    }

    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self, GfxError> {
        Self::from_json(BUILTIN_GFXDEFS)
    }

    fn check_profile(&self, profile: &GfxProfile) -> Result<(), GfxError> {
        let missing = if !self.chrdefs.contains_key(profile.chrdef_id()) {
            Some(("chrdef", profile.chrdef_id()))
        } else if !self.coldefs.contains_key(profile.coldef_id()) {
            Some(("coldef", profile.coldef_id()))
        } else if !self.paldefs.contains_key(profile.paldef_id()) {
            Some(("paldef", profile.paldef_id()))
        } else {
            None
        };
        match missing {
            Some((kind, id)) => Err(GfxError::invalid(
                "profile",
                profile.id(),
                format!("refers to unknown {kind} '{id}'"),
            )),
            None => Ok(()),
        }
    }

    pub fn add_chrdef(&mut self, chrdef: ChrDef) {
        insert_def("chrdef", &mut self.chrdefs, chrdef);
    }

    pub fn add_coldef(&mut self, coldef: ColDef) {
        insert_def("coldef", &mut self.coldefs, coldef);
    }

    pub fn add_paldef(&mut self, paldef: PalDef) {
        insert_def("paldef", &mut self.paldefs, paldef);
    }

    pub fn add_profile(&mut self, profile: GfxProfile) {
        insert_def("profile", &mut self.profiles, profile);
    }

    pub fn chrdef(&self, id: &str) -> Result<&ChrDef, GfxError> {
        lookup("chrdef", &self.chrdefs, id)
    }

    pub fn coldef(&self, id: &str) -> Result<&ColDef, GfxError> {
        lookup("coldef", &self.coldefs, id)
    }

    pub fn paldef(&self, id: &str) -> Result<&PalDef, GfxError> {
        lookup("paldef", &self.paldefs, id)
    }

    pub fn profile(&self, id: &str) -> Result<&GfxProfile, GfxError> {
        lookup("profile", &self.profiles, id)
    }

    pub fn chrdef_ids(&self) -> Vec<&str> {
        sorted_ids(&self.chrdefs)
    }

    pub fn profile_ids(&self) -> Vec<&str> {
        sorted_ids(&self.profiles)
    }

    pub fn resolve(&self, selection: &DefSelection) -> Result<ResolvedDefs<'_>, GfxError> {
        let profile = selection.profile.as_deref().map(|id| self.profile(id)).transpose()?;
        let chrdef_id = pick("chrdef", selection.chrdef.as_deref(), profile.map(GfxProfile::chrdef_id))?;
        let coldef_id = pick("coldef", selection.coldef.as_deref(), profile.map(GfxProfile::coldef_id))?;
        let paldef_id = pick("paldef", selection.paldef.as_deref(), profile.map(GfxProfile::paldef_id))?;

        Ok(ResolvedDefs {
            chrdef: self.chrdef(chrdef_id)?,
            coldef: self.coldef(coldef_id)?,
            paldef: self.paldef(paldef_id)?,
        })
    }
}
