use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::str;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;
use xz::bufread::XzDecoder;

use crate::data::poi::Poi;
use crate::data::route::Coordinate;
use crate::errors::{Error, Result};

/// Reads the points of the single track segment in a GPX file. `.xz` files
/// are decompressed on the fly.
pub fn read_track(path: &Path) -> Result<Vec<Coordinate>> {
    let file = fs::File::open(path)
        .map_err(|err| Error::from(err).context(format!("opening gpx file {}", path.display())))?;
    let file_reader = BufReader::new(file);
    let result = if path.extension().is_some_and(|ext| ext == "xz") {
        parse_track(BufReader::new(XzDecoder::new(file_reader)))
    } else {
        parse_track(file_reader)
    };
    result.map_err(|err| err.context(format!("parsing gpx file {}", path.display())))
}

pub fn parse_track<R: BufRead>(input: R) -> Result<Vec<Coordinate>> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut tracks = 0;
    let mut segments = 0;
    let mut points = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => match e.name().as_ref() {
                b"trk" => tracks += 1,
                b"trkseg" => segments += 1,
                b"trkpt" => points.push(parse_point(&e)?),
                _ => (),
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"trkpt" {
                    points.push(parse_point(&e)?);
                }
            }
            _ => (),
        }
        buf.clear();
    }

    if tracks != 1 {
        return Err(Error::input(format!("expected gpx file to contain exactly one track but found {}", tracks)));
    }
    if segments != 1 {
        return Err(Error::input(format!("expected gpx track to contain exactly one segment but found {}", segments)));
    }
    if points.is_empty() {
        return Err(Error::input("no route points provided"));
    }
    Ok(points)
}

fn parse_point(el: &BytesStart) -> Result<Coordinate> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"lat" => lat = Some(str::from_utf8(&attribute.value)?.trim().parse()?),
            b"lon" => lon = Some(str::from_utf8(&attribute.value)?.trim().parse()?),
            _ => (),
        }
    }

    match (lat, lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => Err(Error::input("track point without lat/lon")),
    }
}

/// Writes POIs as GPX 1.1 waypoints.
pub fn write_waypoints<W: Write>(output: W, pois: &[Poi]) -> Result<()> {
    let mut writer = Writer::new_with_indent(output, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("gpx").with_attributes([
        ("version", "1.1"),
        ("creator", env!("CARGO_PKG_NAME")),
        ("xmlns", "http://www.topografix.com/GPX/1/1"),
    ])))?;

    for poi in pois {
        let lat = format!("{:.7}", poi.lat);
        let lon = format!("{:.7}", poi.lon);
        writer.write_event(Event::Start(
            BytesStart::new("wpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]),
        ))?;
        write_text_element(&mut writer, "name", &poi.name)?;
        write_text_element(&mut writer, "desc", &poi.description)?;
        if !poi.symbol.is_empty() {
            write_text_element(&mut writer, "sym", &poi.symbol)?;
        }
        writer.write_event(Event::End(BytesEnd::new("wpt")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;
    writer.into_inner().flush()?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Writes POIs as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut output: W, pois: &[Poi]) -> Result<()> {
    serde_json::to_writer_pretty(&mut output, pois)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}
