//! On-disk test fixtures.

/// 2x1 uncompressed Radiance file: (1.0, 0.5, 0.0) then (0.25, 0.25, 0.25).
pub(crate) fn tiny_hdr() -> Vec<u8> {
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
    bytes.extend_from_slice(&[128, 64, 0, 129]);
    bytes.extend_from_slice(&[128, 128, 128, 127]);
    bytes
}

/// One triangle in the XY plane under a node translated by (0, 2, 0), with an
/// embedded buffer and a single red material. No normals or UVs.
pub(crate) const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [ 0 ] } ],
  "nodes": [ { "name": "tri", "mesh": 0, "translation": [ 0.0, 2.0, 0.0 ] } ],
  "meshes": [
    {
      "name": "triangle",
      "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ]
    }
  ],
  "materials": [
    {
      "name": "red",
      "pbrMetallicRoughness": {
        "baseColorFactor": [ 1.0, 0.0, 0.0, 1.0 ],
        "metallicFactor": 0.25,
        "roughnessFactor": 0.75
      },
      "emissiveFactor": [ 0.1, 0.2, 0.3 ]
    }
  ],
  "buffers": [
    {
      "byteLength": 44,
      "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
    }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    {
      "bufferView": 0,
      "componentType": 5126,
      "count": 3,
      "type": "VEC3",
      "min": [ 0.0, 0.0, 0.0 ],
      "max": [ 1.0, 1.0, 0.0 ]
    },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

/// Valid glTF with a node but no meshes.
pub(crate) const EMPTY_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [ 0 ] } ],
  "nodes": [ { "name": "empty" } ]
}"#;

pub(crate) fn write_temp(contents: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    tmp.write_all(contents).unwrap();
    tmp.flush().unwrap();
    tmp
}
