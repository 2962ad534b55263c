//! Structural probing of glTF 2.0 documents
//!
//! Only the JSON document is interpreted: extents come from the POSITION accessor bounds and
//! counts from accessor sizes, so vertex data never has to be decoded. Buffers and images are
//! checked for presence, and images are measured.

use std::collections::BTreeSet;

use glam::{Mat4, Vec3};
use gltf::buffer::Source as BufferSource;
use gltf::image::Source as ImageSource;
use gltf::mesh::Mode;
use gltf::{Document, Gltf, Node, Primitive, Semantic};
use tracing::debug;

use threedqc_core::{
    Dimensions, FileBlob, IssueMessage, LoadedModel, ModelStats, Severity, StructuralReport,
    TextureInfo,
};

use crate::error::GltfError;
use crate::texture;

/// Where buffer and image bytes come from.
struct Resources<'a> {
    blob: Option<&'a [u8]>,
    files: &'a [FileBlob],
}

impl<'a> Resources<'a> {
    fn file(&self, uri: &str) -> Option<&'a FileBlob> {
        let wanted = uri.rsplit('/').next().unwrap_or(uri).replace("%20", " ");
        self.files.iter().find(|f| f.name() == wanted)
    }

    fn buffer(&self, buffer: &gltf::Buffer<'_>) -> Option<&'a [u8]> {
        match buffer.source() {
            BufferSource::Bin => self.blob,
            BufferSource::Uri(uri) => self.file(uri).map(FileBlob::bytes),
        }
    }
}

/// Probe a single self-contained file (`.glb`, or a `.gltf` with embedded data).
pub fn probe_glb(file: &FileBlob) -> Result<LoadedModel, GltfError> {
    let gltf = parse(file)?;
    let resources = Resources {
        blob: gltf.blob.as_deref(),
        files: &[],
    };
    let mut model = inspect(&gltf.document, &resources);
    model.filename = file.name().to_string();
    model.file_size_bytes = file.len() as u64;
    model.binary = Some(file.shared_bytes());
    debug!("Probed '{}': {:?}", model.filename, model.stats);
    Ok(model)
}

/// Probe a `.gltf` descriptor whose buffers and images were submitted alongside it.
pub fn probe_gltf_files(files: Vec<FileBlob>) -> Result<LoadedModel, GltfError> {
    let descriptor = files
        .iter()
        .find(|f| f.extension().as_deref() == Some("gltf"))
        .ok_or(GltfError::NoDescriptor(files.len()))?;
    let gltf = parse(descriptor)?;
    let resources = Resources {
        blob: None,
        files: &files,
    };
    let mut model = inspect(&gltf.document, &resources);
    model.filename = descriptor.name().to_string();
    model.file_size_bytes = files.iter().map(|f| f.len() as u64).sum();
    debug!(
        "Probed '{}' with {} files: {:?}",
        model.filename,
        files.len(),
        model.stats
    );
    model.files = files;
    Ok(model)
}

fn parse(file: &FileBlob) -> Result<Gltf, GltfError> {
    Gltf::from_slice(file.bytes()).map_err(|e| GltfError::Parse {
        name: file.name().to_string(),
        message: e.to_string(),
    })
}

fn inspect(document: &Document, resources: &Resources<'_>) -> LoadedModel {
    let mut issues = StructuralReport::default();
    check_buffers(document, resources, &mut issues);
    let stats = count(document);
    let (dimensions, clean_root_transforms) = measure(document, &mut issues);
    let textures = probe_images(document, resources, &mut issues);
    report_unused_meshes(document, &mut issues);

    LoadedModel {
        dimensions,
        stats,
        textures,
        clean_root_transforms,
        issues,
        ..Default::default()
    }
}

fn check_buffers(document: &Document, resources: &Resources<'_>, issues: &mut StructuralReport) {
    for buffer in document.buffers() {
        let pointer = format!("/buffers/{}", buffer.index());
        let label = match buffer.source() {
            BufferSource::Uri(uri) if uri.starts_with("data:") => continue,
            BufferSource::Uri(uri) => uri.to_string(),
            BufferSource::Bin => "binary chunk".to_string(),
        };
        match resources.buffer(&buffer) {
            None => issues.push(IssueMessage::new(
                "IO_ERROR",
                Severity::Error,
                format!("Buffer '{}' was not supplied.", label),
                pointer,
            )),
            Some(bytes) if bytes.len() < buffer.length() => issues.push(IssueMessage::new(
                "BUFFER_EXTERNAL_BYTELENGTH_MISMATCH",
                Severity::Error,
                format!(
                    "Actual data length {} is less than the declared buffer byteLength {}.",
                    bytes.len(),
                    buffer.length()
                ),
                pointer,
            )),
            Some(_) => {}
        }
    }
}

fn count(document: &Document) -> ModelStats {
    let mut stats = ModelStats {
        nodes: document.nodes().count() as u64,
        meshes: document.meshes().count() as u64,
        materials: document.materials().count() as u64,
        ..Default::default()
    };
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            stats.primitives += 1;
            stats.triangles += triangles(&primitive);
        }
    }
    stats
}

/// Triangles drawn by one primitive, counted once per mesh rather than per instance.
fn triangles(primitive: &Primitive<'_>) -> u64 {
    let vertices = match primitive.indices() {
        Some(indices) => indices.count(),
        None => primitive
            .get(&Semantic::Positions)
            .map(|positions| positions.count())
            .unwrap_or(0),
    };
    let vertices = vertices as u64;
    match primitive.mode() {
        Mode::Triangles => vertices / 3,
        Mode::TriangleStrip | Mode::TriangleFan => vertices.saturating_sub(2),
        _ => 0,
    }
}

/// Axis-aligned extent accumulated in scene space.
struct Extent {
    min: Vec3,
    max: Vec3,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }
}

impl Extent {
    fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// glTF is Y-up: height along Y, width along X, length along Z.
    fn dimensions(&self) -> Dimensions {
        if self.min.cmpgt(self.max).any() {
            return Dimensions::default();
        }
        let size = (self.max - self.min).as_dvec3();
        Dimensions::new(size.y, size.z, size.x)
    }
}

/// Scene extent and whether every root node carries an identity transform.
fn measure(document: &Document, issues: &mut StructuralReport) -> (Dimensions, bool) {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        issues.push(IssueMessage::new(
            "NO_SCENE",
            Severity::Warning,
            "The asset has no scene to measure.",
            "",
        ));
        return (Dimensions::default(), true);
    };

    let clean = scene
        .nodes()
        .all(|node| local_transform(&node).abs_diff_eq(Mat4::IDENTITY, 1e-6));
    let mut extent = Extent::default();
    walk(scene.nodes(), &mut extent, issues);
    (extent.dimensions(), clean)
}

fn local_transform(node: &Node<'_>) -> Mat4 {
    Mat4::from_cols_array_2d(&node.transform().matrix())
}

enum Step<'a> {
    Enter(Node<'a>, Mat4),
    Exit(usize),
}

/// Depth-first walk that enters every node at most once.
///
/// A node reached again while it is its own ancestor is a loop; reached again from elsewhere
/// it has more than one parent. Either way it is reported and not descended into.
fn walk<'a>(
    roots: impl Iterator<Item = Node<'a>>,
    extent: &mut Extent,
    issues: &mut StructuralReport,
) {
    let mut visited = BTreeSet::new();
    let mut ancestors = BTreeSet::new();
    let mut stack: Vec<Step<'a>> = roots.map(|node| Step::Enter(node, Mat4::IDENTITY)).collect();
    stack.reverse();

    while let Some(step) = stack.pop() {
        let (node, parent) = match step {
            Step::Exit(index) => {
                ancestors.remove(&index);
                continue;
            }
            Step::Enter(node, parent) => (node, parent),
        };

        let index = node.index();
        if !visited.insert(index) {
            let (code, message) = if ancestors.contains(&index) {
                ("NODE_LOOP", "Node hierarchy contains a loop.")
            } else {
                ("NODE_PARENT_OVERRIDE", "Node is referenced by more than one parent.")
            };
            issues.push(IssueMessage::new(
                code,
                Severity::Error,
                message,
                format!("/nodes/{}", index),
            ));
            continue;
        }

        let world = parent * local_transform(&node);
        include_mesh(&node, world, extent, issues);
        ancestors.insert(index);
        stack.push(Step::Exit(index));
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(Step::Enter(child, world));
        }
    }
}

fn include_mesh(
    node: &Node<'_>,
    world: Mat4,
    extent: &mut Extent,
    issues: &mut StructuralReport,
) {
    let Some(mesh) = node.mesh() else {
        return;
    };
    for primitive in mesh.primitives() {
        match position_bounds(&primitive) {
            Some((min, max)) => {
                for corner in corners(min, max) {
                    extent.include(world.transform_point3(corner));
                }
            }
            None => issues.push(IssueMessage::new(
                "MESH_PRIMITIVE_POSITION_BOUNDS_MISSING",
                Severity::Warning,
                "POSITION accessor has no usable min/max; primitive not measured.",
                format!("/meshes/{}/primitives/{}", mesh.index(), primitive.index()),
            )),
        }
    }
}

fn position_bounds(primitive: &Primitive<'_>) -> Option<(Vec3, Vec3)> {
    let accessor = primitive.get(&Semantic::Positions)?;
    Some((vec3(accessor.min()?)?, vec3(accessor.max()?)?))
}

fn vec3(value: gltf::json::Value) -> Option<Vec3> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let mut out = [0.0f32; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(Vec3::from_array(out))
}

fn corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    std::array::from_fn(|i| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    })
}

fn probe_images(
    document: &Document,
    resources: &Resources<'_>,
    issues: &mut StructuralReport,
) -> Vec<TextureInfo> {
    let mut textures = Vec::new();
    for image in document.images() {
        let pointer = format!("/images/{}", image.index());
        let (name, bytes) = match image.source() {
            ImageSource::Uri { uri, .. } if uri.starts_with("data:") => {
                issues.push(IssueMessage::new(
                    "DATA_URI_NOT_MEASURED",
                    Severity::Info,
                    "Embedded data URI image was not measured.",
                    pointer,
                ));
                continue;
            }
            ImageSource::Uri { uri, .. } => (
                image.name().unwrap_or(uri).to_string(),
                resources.file(uri).map(FileBlob::bytes),
            ),
            ImageSource::View { view, .. } => {
                let start = view.offset();
                let bytes = resources
                    .buffer(&view.buffer())
                    .and_then(|buffer| buffer.get(start..start + view.length()));
                let name = image
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("image{}", image.index()));
                (name, bytes)
            }
        };

        let Some(bytes) = bytes else {
            issues.push(IssueMessage::new(
                "IO_ERROR",
                Severity::Error,
                format!("Image '{}' could not be read.", name),
                pointer,
            ));
            continue;
        };
        match texture::probe_dimensions(&name, bytes) {
            Ok((width, height)) => textures.push(TextureInfo {
                name,
                width,
                height,
            }),
            Err(err) => issues.push(IssueMessage::new(
                "INVALID_IMAGE",
                Severity::Error,
                err.to_string(),
                pointer,
            )),
        }
    }
    textures
}

fn report_unused_meshes(document: &Document, issues: &mut StructuralReport) {
    let used: BTreeSet<usize> = document
        .nodes()
        .filter_map(|node| node.mesh().map(|mesh| mesh.index()))
        .collect();
    for mesh in document.meshes().filter(|mesh| !used.contains(&mesh.index())) {
        issues.push(IssueMessage::new(
            "UNUSED_OBJECT",
            Severity::Info,
            "This object may be unused.",
            format!("/meshes/{}", mesh.index()),
        ));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use threedqc_core::FileBlob;

    /// One triangle spanning x 0..1, y 0..2, z 0..3.
    pub const TRIANGLE_BIN_LEN: usize = 36;

    pub fn triangle_json(buffer_uri: Option<&str>, extra_root: &str) -> String {
        let uri = buffer_uri
            .map(|uri| format!(r#""uri":"{uri}","#))
            .unwrap_or_default();
        format!(
            r#"{{
  "asset": {{"version": "2.0"}},
  "scene": 0,
  "scenes": [{{"nodes": [0]}}],
  "nodes": [{{"mesh": 0}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "accessors": [{{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0, 0, 0], "max": [1, 2, 3]}}],
  "bufferViews": [{{"buffer": 0, "byteLength": 36}}],
  "buffers": [{{{uri}"byteLength": 36}}]{extra_root}
}}"#
        )
    }

    /// Pack a JSON chunk and a binary chunk into a GLB container.
    pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        let total = 12 + 8 + json.len() + 8 + bin.len();

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    pub fn triangle_glb(name: &str) -> FileBlob {
        FileBlob::new(
            name,
            glb(&triangle_json(None, ""), &[0u8; TRIANGLE_BIN_LEN]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::texture::png;

    #[test]
    fn glb_extent_and_counts() {
        let model = probe_glb(&triangle_glb("tri.glb")).unwrap();
        assert_eq!(model.filename, "tri.glb");
        assert_eq!(model.dimensions, Dimensions::new(2.0, 3.0, 1.0));
        assert_eq!(model.stats.nodes, 1);
        assert_eq!(model.stats.meshes, 1);
        assert_eq!(model.stats.primitives, 1);
        assert_eq!(model.stats.triangles, 1);
        assert!(model.clean_root_transforms);
        assert!(model.binary.is_some());
        assert!(!model.issues.has_errors(), "{:?}", model.issues);
    }

    #[test]
    fn node_transforms_apply_to_extent() {
        let json = triangle_json(None, "").replace(
            r#""nodes": [{"mesh": 0}]"#,
            r#""nodes": [{"mesh": 0, "scale": [2, 2, 2]}]"#,
        );
        let model = probe_glb(&FileBlob::new("big.glb", glb(&json, &[0u8; 36]))).unwrap();
        assert_eq!(model.dimensions, Dimensions::new(4.0, 6.0, 2.0));
        assert!(!model.clean_root_transforms);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = probe_glb(&FileBlob::new("junk.glb", b"nope".to_vec())).unwrap_err();
        assert!(matches!(err, GltfError::Parse { ref name, .. } if name == "junk.glb"));
    }

    #[test]
    fn multi_file_resolves_buffers_and_images() {
        let extra = r#",
  "images": [{"uri": "albedo.png"}]"#;
        let files = vec![
            FileBlob::new("tri.bin", vec![0u8; TRIANGLE_BIN_LEN]),
            FileBlob::new("tri.gltf", triangle_json(Some("tri.bin"), extra).into_bytes()),
            FileBlob::new("albedo.png", png(16, 8)),
        ];
        let model = probe_gltf_files(files).unwrap();
        assert_eq!(model.filename, "tri.gltf");
        assert_eq!(model.files.len(), 3);
        assert!(model.binary.is_none());
        assert_eq!(
            model.textures,
            vec![TextureInfo {
                name: "albedo.png".to_string(),
                width: 16,
                height: 8,
            }]
        );
        assert!(!model.issues.has_errors(), "{:?}", model.issues);
    }

    #[test]
    fn missing_sibling_files_become_errors() {
        let extra = r#",
  "images": [{"uri": "albedo.png"}]"#;
        let files = vec![
            FileBlob::new("tri.gltf", triangle_json(Some("tri.bin"), extra).into_bytes()),
            FileBlob::new("notes.txt", b"hello".to_vec()),
        ];
        let model = probe_gltf_files(files).unwrap();
        let codes: Vec<_> = model.issues.messages.iter().map(|m| m.pointer.as_str()).collect();
        assert_eq!(codes, ["/buffers/0", "/images/0"]);
        assert_eq!(model.issues.count(Severity::Error), 2);
        // Extent comes from accessor bounds, so it survives a missing buffer.
        assert_eq!(model.dimensions, Dimensions::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn short_buffer_is_reported() {
        let files = vec![
            FileBlob::new("tri.bin", vec![0u8; 12]),
            FileBlob::new("tri.gltf", triangle_json(Some("tri.bin"), "").into_bytes()),
        ];
        let model = probe_gltf_files(files).unwrap();
        assert_eq!(model.issues.messages[0].code, "BUFFER_EXTERNAL_BYTELENGTH_MISMATCH");
    }

    #[test]
    fn no_descriptor() {
        let files = vec![FileBlob::new("tri.bin", vec![0u8; 36])];
        assert!(matches!(
            probe_gltf_files(files),
            Err(GltfError::NoDescriptor(1))
        ));
    }

    fn codes(model: &LoadedModel, code: &str) -> Vec<String> {
        model
            .issues
            .messages
            .iter()
            .filter(|m| m.code == code)
            .map(|m| m.pointer.clone())
            .collect()
    }

    #[test]
    fn node_that_is_its_own_child_is_a_loop() {
        let json = triangle_json(None, "").replace(
            r#""nodes": [{"mesh": 0}]"#,
            r#""nodes": [{"mesh": 0, "children": [0, 0]}]"#,
        );
        let model = probe_glb(&FileBlob::new("loop.glb", glb(&json, &[0u8; 36]))).unwrap();
        assert_eq!(codes(&model, "NODE_LOOP"), ["/nodes/0", "/nodes/0"]);
        assert!(model.issues.has_errors());
        assert_eq!(model.dimensions, Dimensions::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn shared_children_are_entered_once() {
        const DEPTH: usize = 40;
        let nodes: Vec<String> = (0..DEPTH)
            .map(|i| {
                let mesh = if i == 0 { r#""mesh": 0, "# } else { "" };
                if i + 1 < DEPTH {
                    format!(r#"{{{mesh}"children": [{next}, {next}]}}"#, next = i + 1)
                } else {
                    "{}".to_string()
                }
            })
            .collect();
        let json = triangle_json(None, "").replace(
            r#""nodes": [{"mesh": 0}]"#,
            &format!(r#""nodes": [{}]"#, nodes.join(", ")),
        );
        let model = probe_glb(&FileBlob::new("chain.glb", glb(&json, &[0u8; 36]))).unwrap();
        assert_eq!(model.stats.nodes, DEPTH as u64);
        assert_eq!(codes(&model, "NODE_PARENT_OVERRIDE").len(), DEPTH - 1);
        assert!(codes(&model, "NODE_LOOP").is_empty());
    }

    #[test]
    fn unused_meshes_are_hinted() {
        let json = triangle_json(None, "").replace(
            r#""meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}]"#,
            r#""meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]},
                         {"primitives": [{"attributes": {"POSITION": 0}}]}]"#,
        );
        let model = probe_glb(&FileBlob::new("two.glb", glb(&json, &[0u8; 36]))).unwrap();
        assert_eq!(model.stats.triangles, 2);
        let unused: Vec<_> = model
            .issues
            .messages
            .iter()
            .filter(|m| m.code == "UNUSED_OBJECT")
            .map(|m| m.pointer.as_str())
            .collect();
        assert_eq!(unused, ["/meshes/1"]);
    }
}
