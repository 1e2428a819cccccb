use pedigree_core::{
    Affected, Carrier, CarrierType, IndividualAttrs, IndividualId, ParentChildLink,
    PartnershipAttrs, PedigreeGraph, Pregnancy, PregnancyOutcome, Sex, UnionStatus, VitalStatus,
};
use pedigree_layout::{LayoutOptions, ManualPins, layout_graph};
use pedigree_render::{
    LegendKey, NodeShape, RenderModel, RenderOptions, Shading, SvgOptions, ViewBox, build_render_model,
    render_svg,
};

fn render(graph: &PedigreeGraph, selected: Option<&str>) -> RenderModel {
    let layout = layout_graph(graph, &ManualPins::new(), &LayoutOptions::default()).unwrap();
    let options = RenderOptions::default().with_reference_year(2024);
    build_render_model(graph, &layout, selected, &options)
}

fn svg_of(model: &RenderModel) -> String {
    render_svg(model, &ViewBox::around(&model.bounds, 80.0), &SvgOptions::default())
}

fn has_class(node: &roxmltree::Node<'_, '_>, class: &str) -> bool {
    node.attribute("class")
        .is_some_and(|c| c.split_whitespace().any(|part| part == class))
}

fn cousins() -> (PedigreeGraph, IndividualId, IndividualId) {
    let mut g = PedigreeGraph::new();
    let gp = g.add_individual(IndividualAttrs::with_sex(Sex::M));
    let a = g.add_individual(IndividualAttrs::with_sex(Sex::M));
    let b = g.add_individual(IndividualAttrs::with_sex(Sex::F));
    for c in [&a, &b] {
        g.set_parent_child_link(ParentChildLink::new(c.clone(), Some(gp.clone()), None))
            .unwrap();
    }
    (g, a, b)
}

#[test]
fn consanguineous_union_is_drawn_as_a_double_line() {
    let (mut g, a, b) = cousins();
    g.add_partnership(
        &a,
        &b,
        PartnershipAttrs {
            consanguinity: true,
            ..Default::default()
        },
    )
    .unwrap();

    let model = render(&g, None);
    assert_eq!(model.couples.len(), 1);
    let couple = &model.couples[0];
    assert!(couple.consanguinity);
    assert_eq!(couple.segments.len(), 2);
    assert_eq!(couple.segments[0].x1, couple.segments[1].x1);
    assert_ne!(couple.segments[0].y1, couple.segments[1].y1);

    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let group = doc
        .descendants()
        .find(|n| has_class(n, "consanguineous"))
        .unwrap();
    let lines = group
        .children()
        .filter(|n| has_class(n, "couple-line"))
        .count();
    assert_eq!(lines, 2);
}

#[test]
fn plain_and_ended_unions() {
    let (mut g, a, b) = cousins();
    let u = g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();
    let model = render(&g, None);
    assert_eq!(model.couples[0].segments.len(), 1);
    assert!(model.couples[0].ended_slash.is_none());

    g.set_partnership_status(u.as_str(), UnionStatus::Ended)
        .unwrap();
    let model = render(&g, None);
    assert!(model.couples[0].ended_slash.is_some());
    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert!(doc.descendants().any(|n| has_class(&n, "ended-slash")));
}

#[test]
fn affected_carrier_is_filled_and_legend_lists_only_used_shadings() {
    let mut g = PedigreeGraph::new();
    let id = g.add_individual(IndividualAttrs {
        sex: Sex::F,
        affected: Some(Affected {
            value: true,
            dx: vec!["X-linked hypophosphatemia".into()],
        }),
        carrier: Some(Carrier {
            kind: CarrierType::X,
            ..Default::default()
        }),
        ..Default::default()
    });

    let model = render(&g, None);
    let node = model.nodes.iter().find(|n| n.id == id).unwrap();
    assert_eq!(node.shading, Shading::Filled);

    let keys: Vec<LegendKey> = model.legend.iter().map(|e| e.key).collect();
    assert_eq!(
        keys,
        vec![
            LegendKey::Male,
            LegendKey::Female,
            LegendKey::Unspecified,
            LegendKey::Filled
        ]
    );
    assert_eq!(model.legend[3].label, "Afectado clínicamente");

    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert!(doc.descendants().any(|n| has_class(&n, "shading-filled")));
    assert!(!doc.descendants().any(|n| has_class(&n, "carrier-dot")));
    let legend_keys: Vec<&str> = doc
        .descendants()
        .filter(|n| has_class(n, "legend-entry"))
        .filter_map(|n| n.attribute("data-key"))
        .collect();
    assert_eq!(legend_keys, vec!["male", "female", "unspecified", "filled"]);
}

#[test]
fn proband_ring_is_on_exactly_the_proband() {
    let mut g = PedigreeGraph::new();
    let p = g.add_individual(IndividualAttrs::with_sex(Sex::M).proband());
    g.add_individual(IndividualAttrs::with_sex(Sex::F));

    let model = render(&g, Some(p.as_str()));
    let ringed: Vec<&IndividualId> = model
        .nodes
        .iter()
        .filter(|n| n.proband_ring.is_some())
        .map(|n| &n.id)
        .collect();
    assert_eq!(ringed, vec![&p]);

    let selected = model.nodes.iter().find(|n| n.id == p).unwrap();
    let other = model.nodes.iter().find(|n| n.id != p).unwrap();
    assert_ne!(selected.stroke, other.stroke);

    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let rings: Vec<_> = doc
        .descendants()
        .filter(|n| has_class(n, "proband-ring"))
        .collect();
    assert_eq!(rings.len(), 1);
    assert_eq!(rings[0].attribute("r"), Some("28"));
    assert_eq!(rings[0].attribute("stroke-dasharray"), Some("4 3"));
}

#[test]
fn deceased_individual_gets_a_slash_and_death_line() {
    let mut g = PedigreeGraph::new();
    g.add_individual(IndividualAttrs {
        sex: Sex::M,
        display_name: Some("Pedro Gómez".into()),
        vital_status: Some(VitalStatus::Deceased {
            year: None,
            note: Some("d. 60s".into()),
        }),
        ..Default::default()
    });

    let model = render(&g, None);
    assert_eq!(model.nodes[0].label_top, "PG");
    assert_eq!(model.nodes[0].label_bottom_lines, vec!["d. 60s"]);

    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert!(doc.descendants().any(|n| has_class(&n, "deceased-slash")));
    let texts: Vec<&str> = doc
        .descendants()
        .filter(|n| has_class(n, "label-bottom"))
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(texts, vec!["d. 60s"]);
}

#[test]
fn svg_uses_the_supplied_view_box() {
    let (g, ..) = cousins();
    let model = render(&g, None);
    let vb = ViewBox {
        x: -10.0,
        y: -20.0,
        width: 300.0,
        height: 200.0,
    };
    let svg = render_svg(&model, &vb, &SvgOptions::default());
    let doc = roxmltree::Document::parse(&svg).unwrap();
    assert_eq!(doc.root_element().attribute("viewBox"), Some("-10 -20 300 200"));
    let descents = doc
        .descendants()
        .filter(|n| has_class(n, "descent"))
        .count();
    assert_eq!(descents, 2);
}

#[test]
fn pregnancy_loss_is_a_triangle_with_its_legend_entry() {
    let mut g = PedigreeGraph::new();
    let f = g.add_individual(IndividualAttrs::with_sex(Sex::M));
    let m = g.add_individual(IndividualAttrs::with_sex(Sex::F));
    g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();
    let ongoing = g
        .upsert_pregnancy(Pregnancy::new(Some(m.clone()), Some(f.clone())))
        .unwrap();

    let model = render(&g, None);
    assert_eq!(model.pregnancies.len(), 1);
    assert_eq!(model.pregnancies[0].shape, NodeShape::Diamond);
    assert!(!model.legend.iter().any(|e| e.key == LegendKey::Triangle));

    let mut lost = Pregnancy::new(Some(m), Some(f)).with_outcome(PregnancyOutcome::SAB);
    lost.gestational_age_wks = Some(10);
    let lost = g.upsert_pregnancy(lost).unwrap();

    let model = render(&g, None);
    let triangle = model.pregnancies.iter().find(|p| p.id == lost).unwrap();
    assert_eq!(triangle.shape, NodeShape::Triangle);
    assert_eq!(triangle.label_lines, vec!["SAB", "10 sem"]);
    let last = model.legend.last().unwrap();
    assert_eq!(last.key, LegendKey::Triangle);
    assert_eq!(last.label, "Embarazo no a término");

    let svg = svg_of(&model);
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let groups: Vec<&str> = doc
        .descendants()
        .filter(|n| has_class(n, "pregnancy"))
        .filter_map(|n| n.attribute("data-id"))
        .collect();
    assert_eq!(groups, vec![ongoing.as_str(), lost.as_str()]);
    assert!(doc.descendants().any(|n| has_class(&n, "pregnancy-mark")));
    assert!(
        doc.descendants()
            .any(|n| has_class(&n, "legend-entry") && n.attribute("data-key") == Some("triangle"))
    );
}
