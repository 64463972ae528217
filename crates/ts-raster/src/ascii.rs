//! ESRI ASCII grid reader.
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    652000.0
//! yllcorner    6861000.0
//! cellsize     25.0
//! NODATA_value -99999
//! 41.2 41.9 42.0 ...
//! ```
//!
//! Header keys are case-insensitive.  `xllcenter`/`yllcenter` are accepted
//! in place of the corner keys.  `NODATA_value` is optional.  The body
//! starts at the first line whose first token is a number (`nan` and `inf`
//! included), or at any line other than `NODATA_value` once the required
//! keys are all present.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::{GeoTransform, Raster, RasterError, RasterResult};

#[derive(Default)]
struct Header {
    ncols:     Option<usize>,
    nrows:     Option<usize>,
    xll:       Option<(f64, bool)>,
    yll:       Option<(f64, bool)>,
    cellsize:  Option<f64>,
    nodata:    Option<f64>,
}

impl Header {
    fn is_complete(&self) -> bool {
        self.ncols.is_some()
            && self.nrows.is_some()
            && self.xll.is_some()
            && self.yll.is_some()
            && self.cellsize.is_some()
    }

    /// Consume one header line.  Returns `false` when the line is not a
    /// header line (the body has started).
    fn accept(&mut self, line: &str) -> RasterResult<bool> {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            return Ok(false);
        };
        if key.parse::<f64>().is_ok() {
            return Ok(false);
        }
        let key = key.to_ascii_lowercase();
        if self.is_complete() && key != "nodata_value" {
            return Ok(false);
        }
        let num = |v: &str| -> RasterResult<f64> {
            v.parse().map_err(|_| RasterError::Header(format!("{key}: {v:?} is not a number")))
        };
        match key.as_str() {
            "ncols"        => self.ncols = Some(num(value)? as usize),
            "nrows"        => self.nrows = Some(num(value)? as usize),
            "xllcorner"    => self.xll = Some((num(value)?, false)),
            "xllcenter"    => self.xll = Some((num(value)?, true)),
            "yllcorner"    => self.yll = Some((num(value)?, false)),
            "yllcenter"    => self.yll = Some((num(value)?, true)),
            "cellsize"     => self.cellsize = Some(num(value)?),
            "nodata_value" => self.nodata = Some(num(value)?),
            other          => return Err(RasterError::Header(format!("unknown key {other:?}"))),
        }
        Ok(true)
    }

    fn finish(self) -> RasterResult<(usize, usize, GeoTransform, Option<f64>)> {
        let missing = |k: &str| RasterError::Header(format!("missing {k}"));
        let ncols = self.ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = self.nrows.ok_or_else(|| missing("nrows"))?;
        let (xll, x_center) = self.xll.ok_or_else(|| missing("xllcorner"))?;
        let (yll, y_center) = self.yll.ok_or_else(|| missing("yllcorner"))?;
        let cell = self.cellsize.ok_or_else(|| missing("cellsize"))?;
        if cell <= 0.0 {
            return Err(RasterError::Header(format!("cellsize must be positive, got {cell}")));
        }

        let left = if x_center { xll - cell / 2.0 } else { xll };
        let bottom = if y_center { yll - cell / 2.0 } else { yll };
        let transform = GeoTransform {
            origin_x:     left,
            origin_y:     bottom + cell * nrows as f64,
            pixel_width:  cell,
            pixel_height: -cell,
        };
        Ok((ncols, nrows, transform, self.nodata))
    }
}

impl Raster {
    /// Parse an ESRI ASCII grid from any reader.
    pub fn from_ascii_grid<R: Read>(reader: R) -> RasterResult<Self> {
        let mut header = Header::default();
        let mut data = Vec::new();
        let mut in_body = false;

        for line in BufReader::new(reader).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if !in_body && header.accept(&line)? {
                continue;
            }
            in_body = true;
            for tok in line.split_whitespace() {
                let v: f32 = tok.parse().map_err(|_| RasterError::Cell(tok.to_owned()))?;
                data.push(v);
            }
        }

        let (width, height, transform, nodata) = header.finish()?;
        Raster::from_grid(width, height, data, transform, nodata)
    }

    /// Load a `.asc` file from disk.
    pub fn open(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let raster = Self::from_ascii_grid(File::open(path)?)?;
        debug!(
            "loaded raster {} ({}x{}, bounds {:?})",
            path.display(),
            raster.width(),
            raster.height(),
            raster.bounds(),
        );
        Ok(raster)
    }
}
