use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF Orientation（1〜8）を読む。EXIFがない・読めない場合は None
pub fn read_orientation(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;

    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).filter(|v| (1..=8).contains(v))
}
