//! Baseline rule set evaluated against a probed model

use threedqc_core::{
    Bounds, Dimensions, DimensionBounds, LoadedModel, ProductInfo, ReportItem, SchemaConfig,
    Severity, TextureInfo, STRUCTURAL_RULE_NAME,
};

const GUIDELINES: &str = "https://github.com/KhronosGroup/3DC-Asset-Creation/blob/main/asset-creation-guidelines/RealtimeAssetCreationGuidelines.md";

fn guideline(anchor: &str) -> String {
    format!("{GUIDELINES}#{anchor}")
}

fn item(name: &str, tested: bool, pass: bool, message: String, anchor: &str) -> ReportItem {
    ReportItem {
        name: name.to_string(),
        tested,
        pass: tested && pass,
        message,
        component_message: String::new(),
        guidelines_url: guideline(anchor),
    }
}

fn range_text(bounds: &Bounds) -> String {
    match (bounds.minimum >= 0, bounds.maximum >= 0) {
        (true, true) => format!("{} to {}", bounds.minimum, bounds.maximum),
        (true, false) => format!("at least {}", bounds.minimum),
        (false, true) => format!("at most {}", bounds.maximum),
        (false, false) => "any".to_string(),
    }
}

fn bounded(name: &str, value: f64, shown: String, bounds: &Bounds, anchor: &str) -> ReportItem {
    item(
        name,
        bounds.is_tested(),
        bounds.admits(value),
        format!("{} (allowed: {})", shown, range_text(bounds)),
        anchor,
    )
}

fn flag(name: &str, required: bool, pass: bool, message: String, anchor: &str) -> ReportItem {
    item(name, required, pass, message, anchor)
}

fn not_evaluated(name: &str, anchor: &str) -> ReportItem {
    item(
        name,
        false,
        false,
        "Not evaluated by this validator".to_string(),
        anchor,
    )
}

/// Evaluate every rule. The order of the returned items is stable.
pub fn evaluate(
    model: &LoadedModel,
    schema: &SchemaConfig,
    product_info: Option<&ProductInfo>,
) -> Vec<ReportItem> {
    let stats = &model.stats;
    let counts = &schema.model.object_count;
    let size_kb = model.file_size_bytes as f64 / 1024.0;

    let mut items = vec![
        structural(model),
        bounded(
            "File Size",
            size_kb,
            format!("{:.1} KB", size_kb),
            &schema.file_size_in_kb,
            "file-size",
        ),
        bounded(
            "Material Count",
            stats.materials as f64,
            stats.materials.to_string(),
            &schema.materials,
            "materials",
        ),
        bounded(
            "Node Count",
            stats.nodes as f64,
            stats.nodes.to_string(),
            &counts.nodes,
            "object-count",
        ),
        bounded(
            "Mesh Count",
            stats.meshes as f64,
            stats.meshes.to_string(),
            &counts.meshes,
            "object-count",
        ),
        bounded(
            "Primitive Count",
            stats.primitives as f64,
            stats.primitives.to_string(),
            &counts.primitives,
            "object-count",
        ),
        bounded(
            "Triangle Count",
            stats.triangles as f64,
            stats.triangles.to_string(),
            &schema.model.triangles,
            "triangle-count",
        ),
        flag(
            "Root Node Transform",
            schema.model.require_clean_root_node_transform,
            model.clean_root_transforms,
            if model.clean_root_transforms {
                "Root nodes have identity transforms".to_string()
            } else {
                "A root node has a non-identity transform".to_string()
            },
            "root-node-transform",
        ),
    ];

    items.extend(dimension_items(&model.dimensions, schema));
    items.extend(texture_items(&model.textures, schema));
    items.push(product_tolerance(&model.dimensions, schema, product_info));

    items.push(not_evaluated("Beveled Edges", "beveled-edges"));
    items.push(not_evaluated("Manifold Edges", "manifold-edges"));
    items.push(not_evaluated("PBR Color Range", "pbr-color-range"));
    items.push(not_evaluated("UV Gutter Width", "uv-gutter-width"));
    items.push(not_evaluated("UV Pixels per Meter", "texel-density"));
    items.push(not_evaluated("UVs Not Inverted", "inverted-uvs"));
    items.push(not_evaluated("UVs Not Overlapping", "overlapping-uvs"));
    items.push(not_evaluated("UVs in 0-1 Range", "uv-range"));
    items
}

fn structural(model: &LoadedModel) -> ReportItem {
    let issues = &model.issues;
    let summary = Severity::ALL
        .iter()
        .map(|severity| format!("{} {}", issues.count(*severity), severity.name()))
        .collect::<Vec<_>>()
        .join(", ");
    item(
        STRUCTURAL_RULE_NAME,
        true,
        !issues.has_errors(),
        summary,
        "gltf-validator",
    )
}

fn dimension_items(dimensions: &Dimensions, schema: &SchemaConfig) -> Vec<ReportItem> {
    let limits = &schema.product.dimensions;
    [
        ("Height", dimensions.height, &limits.height),
        ("Length", dimensions.length, &limits.length),
        ("Width", dimensions.width, &limits.width),
    ]
    .into_iter()
    .map(|(axis, value, limit)| {
        bounded(
            &format!("Dimensions ({axis})"),
            value,
            format!("{:.3} m", value),
            &limit.bounds(),
            "dimensions",
        )
    })
    .collect()
}

fn texture_items(textures: &[TextureInfo], schema: &SchemaConfig) -> Vec<ReportItem> {
    let rules = &schema.textures;
    let failing = |check: &dyn Fn(&TextureInfo) -> bool| -> Vec<String> {
        textures
            .iter()
            .filter(|t| !check(t))
            .map(|t| format!("{} ({}x{})", t.name, t.width, t.height))
            .collect()
    };
    let summary = |bad: Vec<String>| {
        if bad.is_empty() {
            format!("{} textures checked", textures.len())
        } else {
            format!("Failing: {}", bad.join(", "))
        }
    };
    let has_textures = !textures.is_empty();

    let size_tested = has_textures && (rules.width.is_tested() || rules.height.is_tested());
    let bad_size = failing(&|t: &TextureInfo| {
        rules.width.admits(t.width as f64) && rules.height.admits(t.height as f64)
    });
    let bad_pow2 = failing(&|t: &TextureInfo| {
        t.width.is_power_of_two() && t.height.is_power_of_two()
    });
    let bad_square = failing(&|t: &TextureInfo| t.width == t.height);

    vec![
        item(
            "Texture Dimensions",
            size_tested,
            bad_size.is_empty(),
            summary(bad_size),
            "texture-dimensions",
        ),
        flag(
            "Texture Dimensions Power of Two",
            has_textures && rules.require_dimensions_be_powers_of_two,
            bad_pow2.is_empty(),
            summary(bad_pow2),
            "texture-dimensions",
        ),
        flag(
            "Texture Dimensions Quadratic",
            has_textures && rules.require_dimensions_be_quadratic,
            bad_square.is_empty(),
            summary(bad_square),
            "texture-dimensions",
        ),
    ]
}

fn product_tolerance(
    dimensions: &Dimensions,
    schema: &SchemaConfig,
    product_info: Option<&ProductInfo>,
) -> ReportItem {
    let name = "Product Dimensions Within Tolerance";
    let Some(expected) = product_info.and_then(|info| info.dimensions) else {
        return item(
            name,
            false,
            false,
            "No product dimensions supplied".to_string(),
            "dimensions",
        );
    };
    let limits = &schema.product.dimensions;
    let axes: [(&str, f64, f64, &DimensionBounds); 3] = [
        ("height", dimensions.height, expected.height, &limits.height),
        ("length", dimensions.length, expected.length, &limits.length),
        ("width", dimensions.width, expected.width, &limits.width),
    ];
    let off: Vec<String> = axes
        .iter()
        .filter(|(_, actual, wanted, limit)| !limit.within_tolerance(*actual, *wanted))
        .map(|(axis, actual, wanted, limit)| {
            format!(
                "{axis} {:.3} m vs {:.3} m (±{}%)",
                actual, wanted, limit.percent_tolerance
            )
        })
        .collect();
    let message = if off.is_empty() {
        "Model matches product dimensions".to_string()
    } else {
        off.join(", ")
    };
    item(name, true, off.is_empty(), message, "dimensions")
}
