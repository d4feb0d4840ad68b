use std::str::FromStr;

use roxmltree::{Document, Node};
use thiserror::Error;

use crate::world::tilemap::{Tilemap, TilemapError};

/// Flip/rotation flags Tiled packs into the top bits of a global tile id.
const GID_FLAG_MASK: u32 = 0xE000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TiledError {
    #[error("malformed TMX: {message} (line={}, column={})", .location.line, .location.column)]
    Malformed {
        message: String,
        location: SourceLocation,
    },
    #[error("root element must be <map>, found <{found}> (line={}, column={})", .location.line, .location.column)]
    InvalidRoot {
        found: String,
        location: SourceLocation,
    },
    #[error("<{element}> is missing attribute '{attribute}' (line={}, column={})", .location.line, .location.column)]
    MissingAttribute {
        element: String,
        attribute: String,
        location: SourceLocation,
    },
    #[error("<{element}> attribute '{attribute}' has invalid value '{value}' (line={}, column={})", .location.line, .location.column)]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        location: SourceLocation,
    },
    #[error("layer '{layer}' uses unsupported encoding '{encoding}'; only csv is supported")]
    UnsupportedEncoding { layer: String, encoding: String },
    #[error("layer '{layer}' has invalid tile '{value}' at index {index}")]
    InvalidTile {
        layer: String,
        index: usize,
        value: String,
    },
    #[error("layer '{layer}' has the wrong shape")]
    Shape {
        layer: String,
        #[source]
        source: TilemapError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TiledLayer {
    pub name: String,
    pub tiles: Tilemap,
}

/// The parts of a Tiled map the world needs: grid shape and CSV tile layers.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub layers: Vec<TiledLayer>,
}

impl TiledMap {
    pub fn layer(&self, name: &str) -> Option<&Tilemap> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| &layer.tiles)
    }
}

pub fn parse_tmx(raw: &str) -> Result<TiledMap, TiledError> {
    let doc = Document::parse(raw).map_err(|error| TiledError::Malformed {
        message: error.to_string(),
        location: SourceLocation {
            line: error.pos().row,
            column: error.pos().col,
        },
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(TiledError::InvalidRoot {
            found: root.tag_name().name().to_string(),
            location: location_of(&doc, root),
        });
    }

    let width = required_attr::<u32>(&doc, root, "width")?;
    let height = required_attr::<u32>(&doc, root, "height")?;
    let tile_width = required_attr::<u32>(&doc, root, "tilewidth")?;
    let tile_height = required_attr::<u32>(&doc, root, "tileheight")?;

    let mut layers = Vec::new();
    for node in root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "layer")
    {
        layers.push(parse_layer(&doc, node, width, height)?);
    }

    Ok(TiledMap {
        width,
        height,
        tile_width,
        tile_height,
        layers,
    })
}

fn parse_layer(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    map_width: u32,
    map_height: u32,
) -> Result<TiledLayer, TiledError> {
    let name = node.attribute("name").unwrap_or_default().to_string();
    let width = optional_attr::<u32>(doc, node, "width")?.unwrap_or(map_width);
    let height = optional_attr::<u32>(doc, node, "height")?.unwrap_or(map_height);

    let Some(data) = node
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == "data")
    else {
        return Err(TiledError::MissingAttribute {
            element: "layer".to_string(),
            attribute: "data".to_string(),
            location: location_of(doc, node),
        });
    };

    let encoding = data.attribute("encoding").unwrap_or("xml");
    if encoding != "csv" {
        return Err(TiledError::UnsupportedEncoding {
            layer: name,
            encoding: encoding.to_string(),
        });
    }

    let text = data.text().unwrap_or_default();
    let mut symbols = Vec::with_capacity(width as usize * height as usize);
    for (index, value) in text
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .enumerate()
    {
        let gid = value.parse::<u32>().map_err(|_| TiledError::InvalidTile {
            layer: name.clone(),
            index,
            value: value.to_string(),
        })?;
        symbols.push(gid & !GID_FLAG_MASK);
    }

    let tiles = Tilemap::new(width, height, symbols).map_err(|source| TiledError::Shape {
        layer: name.clone(),
        source,
    })?;
    Ok(TiledLayer { name, tiles })
}

fn required_attr<T: FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attribute: &str,
) -> Result<T, TiledError> {
    optional_attr(doc, node, attribute)?.ok_or_else(|| TiledError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        location: location_of(doc, node),
    })
}

fn optional_attr<T: FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attribute: &str,
) -> Result<Option<T>, TiledError> {
    let Some(raw) = node.attribute(attribute) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| TiledError::InvalidAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
            value: raw.to_string(),
            location: location_of(doc, node),
        })
}

fn location_of(doc: &Document<'_>, node: Node<'_, '_>) -> SourceLocation {
    let pos = doc.text_pos_at(node.range().start);
    SourceLocation {
        line: pos.row,
        column: pos.col,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="48" tileheight="48">
 <layer id="1" name="Collisions" width="3" height="2">
  <data encoding="csv">
1025,0,0,
0,0,1025
</data>
 </layer>
 <layer id="2" name="Characters" width="3" height="2">
  <data encoding="csv">
0,1026,0,
0,0,0
</data>
 </layer>
</map>
"#;

    #[test]
    fn parses_csv_layers() {
        let map = parse_tmx(SMALL_MAP).expect("parse");
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!((map.tile_width, map.tile_height), (48, 48));
        assert_eq!(map.layers.len(), 2);

        let collisions = map.layer("Collisions").expect("collisions");
        assert_eq!(collisions.symbol_at(0, 0), Some(1025));
        assert_eq!(collisions.symbol_at(2, 1), Some(1025));
        assert_eq!(map.layer("Characters").and_then(|l| l.symbol_at(1, 0)), Some(1026));
        assert!(map.layer("Missing").is_none());
    }

    #[test]
    fn strips_flip_flags_from_gids() {
        let raw = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
<layer name="L"><data encoding="csv">2147484673</data></layer></map>"#;
        let map = parse_tmx(raw).expect("parse");
        // 0x80000000 | 1025
        assert_eq!(map.layer("L").and_then(|l| l.symbol_at(0, 0)), Some(1025));
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = parse_tmx("<map>\n<layer></map>").expect_err("malformed");
        match err {
            TiledError::Malformed { location, .. } => assert_eq!(location.line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_root_and_missing_attributes() {
        assert!(matches!(
            parse_tmx("<tileset/>"),
            Err(TiledError::InvalidRoot { .. })
        ));
        assert!(matches!(
            parse_tmx(r#"<map width="2" height="2" tilewidth="8"/>"#),
            Err(TiledError::MissingAttribute { attribute, .. }) if attribute == "tileheight"
        ));
        assert!(matches!(
            parse_tmx(r#"<map width="x" height="2" tilewidth="8" tileheight="8"/>"#),
            Err(TiledError::InvalidAttribute { attribute, .. }) if attribute == "width"
        ));
    }

    #[test]
    fn rejects_non_csv_and_bad_shapes() {
        let base64 = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
<layer name="L"><data encoding="base64">AAAA</data></layer></map>"#;
        assert!(matches!(
            parse_tmx(base64),
            Err(TiledError::UnsupportedEncoding { encoding, .. }) if encoding == "base64"
        ));

        let short = r#"<map width="2" height="2" tilewidth="8" tileheight="8">
<layer name="L"><data encoding="csv">1,2,3</data></layer></map>"#;
        assert!(matches!(
            parse_tmx(short),
            Err(TiledError::Shape {
                source: TilemapError::TileCountMismatch { expected: 4, actual: 3 },
                ..
            })
        ));

        let junk = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
<layer name="L"><data encoding="csv">a</data></layer></map>"#;
        assert!(matches!(parse_tmx(junk), Err(TiledError::InvalidTile { index: 0, .. })));
    }
}
