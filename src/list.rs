//! Listing
//!
//! Enumerates valid entries for display by the front ends: a plain id list,
//! a JSON document, or a human-readable dump of header and slots.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::storage::{Header, Resolution, Slot};
use crate::store::ImgStore;

#[derive(Serialize)]
struct Listing<'a> {
    #[serde(rename = "Images")]
    images: Vec<&'a str>,
}

impl ImgStore {
    /// Ids of all valid entries, in slot order
    pub fn list(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| s.valid)
            .map(|s| s.id.as_str())
            .collect()
    }

    /// `{"Images":[...]}` with the ids of all valid entries
    pub fn list_json(&self) -> Result<String> {
        let listing = Listing { images: self.list() };
        Ok(serde_json::to_string(&listing)?)
    }

    /// Human-readable dump of the header and every valid slot
    pub fn write_listing<W: Write>(&self, out: &mut W) -> Result<()> {
        write_header(out, &self.header)?;
        if self.header.num_files == 0 {
            writeln!(out, "<< empty imgStore >>")?;
            return Ok(());
        }
        for slot in self.slots.iter().filter(|s| s.valid) {
            write_slot(out, slot)?;
        }
        Ok(())
    }
}

fn write_header<W: Write>(out: &mut W, header: &Header) -> Result<()> {
    writeln!(out, "*****************************************")?;
    writeln!(out, "**********IMGSTORE HEADER START**********")?;
    writeln!(out, "TYPE: {}", header.name)?;
    writeln!(out, "VERSION: {}", header.version)?;
    writeln!(
        out,
        "IMAGE COUNT: {}\t\tMAX IMAGES: {}",
        header.num_files, header.max_files
    )?;
    writeln!(
        out,
        "THUMBNAIL: {} x {}\tSMALL: {} x {}",
        header.thumb_res.width, header.thumb_res.height, header.small_res.width, header.small_res.height
    )?;
    writeln!(out, "***********IMGSTORE HEADER END***********")?;
    writeln!(out, "*****************************************")?;
    Ok(())
}

fn write_slot<W: Write>(out: &mut W, slot: &Slot) -> Result<()> {
    writeln!(out, "IMAGE ID: {}", slot.id)?;
    writeln!(out, "SHA: {}", slot.digest)?;
    writeln!(out, "VALID: {}", u16::from(slot.valid))?;
    for (label, res) in [
        ("ORIG.", Resolution::Orig),
        ("THUMB.", Resolution::Thumb),
        ("SMALL", Resolution::Small),
    ] {
        writeln!(
            out,
            "OFFSET {} : {}\t\tSIZE {} : {}",
            label,
            slot.offset[res.index()],
            label,
            slot.size[res.index()]
        )?;
    }
    writeln!(out, "ORIGINAL: {} x {}", slot.original_dims.0, slot.original_dims.1)?;
    writeln!(out, "*****************************************")?;
    Ok(())
}
