use pedigree_core::{
    ArtRecord, ArtRole, IndividualAttrs, IndividualId, ParentChildLink, PartnershipAttrs,
    PedigreeGraph, Pregnancy, PregnancyOutcome, RemoveMode, Sex, SiblingKind, StructuralError,
    StructuralErrorKind, UnionStatus,
};

fn person(g: &mut PedigreeGraph, sex: Sex) -> IndividualId {
    g.add_individual(IndividualAttrs::with_sex(sex))
}

fn link(g: &mut PedigreeGraph, child: &IndividualId, f: Option<&IndividualId>, m: Option<&IndividualId>) {
    g.set_parent_child_link(ParentChildLink::new(
        child.clone(),
        f.cloned(),
        m.cloned(),
    ))
    .unwrap();
}

fn assert_parentage_invariants(g: &PedigreeGraph) {
    for l in g.links() {
        assert!(l.parents().count() <= 2);
        assert!(!l.references_parent(&l.child));
        assert!(!g.ancestors_of(l.child.as_str()).contains(&l.child));
    }
}

#[test]
fn full_and_half_siblings_are_distinguished() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);
    let m2 = person(&mut g, Sex::F);
    let s1 = person(&mut g, Sex::U);
    let s2 = person(&mut g, Sex::U);
    let s3 = person(&mut g, Sex::U);
    link(&mut g, &s1, Some(&f), Some(&m));
    link(&mut g, &s2, Some(&f), Some(&m));
    link(&mut g, &s3, Some(&f), Some(&m2));

    let sibs = g.siblings_of(s1.as_str());
    assert_eq!(sibs.len(), 2);
    assert_eq!(sibs[0].id, s2);
    assert_eq!(sibs[0].kind, SiblingKind::Full);
    assert_eq!(sibs[1].id, s3);
    assert_eq!(sibs[1].kind, SiblingKind::Half);
    assert_parentage_invariants(&g);
}

#[test]
fn self_parent_is_rejected_without_mutation() {
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let before = g.to_snapshot();
    let err = g
        .set_parent_child_link(ParentChildLink::new(a.clone(), Some(a.clone()), None))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::SelfReference);
    assert_eq!(g.to_snapshot(), before);
}

#[test]
fn unknown_parent_is_a_dangling_reference() {
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let err = g
        .set_parent_child_link(ParentChildLink::new(a, Some("nobody".into()), None))
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::DanglingReference {
            id: "nobody".to_string()
        }
    );
}

#[test]
fn grandchild_cannot_become_grandparent() {
    let mut g = PedigreeGraph::new();
    let gp = person(&mut g, Sex::M);
    let p = person(&mut g, Sex::M);
    let c = person(&mut g, Sex::M);
    link(&mut g, &p, Some(&gp), None);
    link(&mut g, &c, Some(&p), None);

    let err = g
        .set_parent_child_link(ParentChildLink::new(gp.clone(), Some(c.clone()), None))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::Cycle);
    assert!(g.parents_of(gp.as_str()).is_empty());
    assert_parentage_invariants(&g);
}

#[test]
fn same_individual_cannot_fill_both_parent_slots() {
    let mut g = PedigreeGraph::new();
    let p = person(&mut g, Sex::U);
    let c = person(&mut g, Sex::U);
    let before = g.to_snapshot();

    let err = g
        .set_parent_child_link(ParentChildLink::new(c.clone(), Some(p.clone()), Some(p.clone())))
        .unwrap_err();
    assert_eq!(err, StructuralError::DuplicateParent { parent: p.clone() });
    assert_eq!(err.kind(), StructuralErrorKind::DuplicateParent);
    assert_eq!(g.to_snapshot(), before);
    assert!(g.children_of(p.as_str()).is_empty());
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn union_with_own_grandchild_is_rejected() {
    let mut g = PedigreeGraph::new();
    let gp = person(&mut g, Sex::M);
    let c = person(&mut g, Sex::F);
    let gc = person(&mut g, Sex::F);
    link(&mut g, &c, Some(&gp), None);
    link(&mut g, &gc, None, Some(&c));
    let before = g.to_snapshot();

    for (a, b) in [(&gp, &gc), (&gc, &gp)] {
        let err = g
            .add_partnership(a, b, PartnershipAttrs::default())
            .unwrap_err();
        assert_eq!(err.kind(), StructuralErrorKind::Cycle);
    }
    let err = g
        .add_partnership(&gp, &gc, PartnershipAttrs::default())
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::Cycle {
            path: vec![gp.clone(), c.clone(), gc.clone(), gp.clone()]
        }
    );
    assert_eq!(g.to_snapshot(), before);
}

#[test]
fn partner_cannot_become_a_parent() {
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let b = person(&mut g, Sex::F);
    g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();

    let err = g
        .set_parent_child_link(ParentChildLink::new(b.clone(), Some(a.clone()), None))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::Cycle);
    assert!(g.link_of(b.as_str()).is_none());
}

#[test]
fn unions_cannot_close_a_loop_through_two_families() {
    // a + b; c is b's child; c + d; making d a parent of a would put a both above and
    // below the same row.
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let b = person(&mut g, Sex::F);
    let c = person(&mut g, Sex::M);
    let d = person(&mut g, Sex::F);
    g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();
    link(&mut g, &c, None, Some(&b));
    g.add_partnership(&c, &d, PartnershipAttrs::default()).unwrap();
    let before = g.to_snapshot();

    let err = g
        .set_parent_child_link(ParentChildLink::new(a.clone(), None, Some(d.clone())))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::Cycle);
    assert_eq!(g.to_snapshot(), before);
    assert_parentage_invariants(&g);
}

#[test]
fn second_current_union_for_a_pair_is_rejected() {
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let b = person(&mut g, Sex::F);
    let first = g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();

    let err = g
        .add_partnership(&b, &a, PartnershipAttrs::default())
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::DuplicateActiveUnion);
    assert_eq!(g.partnership_count(), 1);

    g.set_partnership_status(first.as_str(), UnionStatus::Ended)
        .unwrap();
    let second = g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();
    assert_eq!(g.union_between(&a, &b).map(|u| &u.id), Some(&second));

    let err = g
        .set_partnership_status(first.as_str(), UnionStatus::Current)
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::DuplicateActiveUnion);
}

#[test]
fn partners_are_listed_once_in_union_order() {
    let mut g = PedigreeGraph::new();
    let a = person(&mut g, Sex::M);
    let b = person(&mut g, Sex::F);
    let c = person(&mut g, Sex::F);
    let u = g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();
    g.set_partnership_status(u.as_str(), UnionStatus::Ended).unwrap();
    g.add_partnership(&a, &c, PartnershipAttrs::default()).unwrap();
    g.add_partnership(&a, &b, PartnershipAttrs::default()).unwrap();

    assert_eq!(g.partners_of(a.as_str()), vec![&b, &c]);
    assert_eq!(g.partnerships_of(a.as_str()).count(), 3);
}

#[test]
fn removal_without_cascade_is_not_removable() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);
    let c = person(&mut g, Sex::U);
    g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();
    link(&mut g, &c, Some(&f), Some(&m));

    let before = g.to_snapshot();
    let err = g
        .remove_individual(f.as_str(), RemoveMode::STRICT)
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::NotRemovable {
            id: f.clone(),
            partnerships: 1,
            children: 1,
            pregnancies: 0,
        }
    );
    assert_eq!(g.to_snapshot(), before);
}

#[test]
fn cascade_detaches_but_keeps_children() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);
    let c = person(&mut g, Sex::U);
    let solo = person(&mut g, Sex::U);
    g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();
    link(&mut g, &c, Some(&f), Some(&m));
    link(&mut g, &solo, Some(&f), None);

    g.remove_individual(f.as_str(), RemoveMode::CASCADE).unwrap();

    assert!(!g.contains(f.as_str()));
    assert!(g.contains(c.as_str()));
    assert_eq!(g.partnership_count(), 0);
    assert_eq!(g.parents_of(c.as_str()).father, None);
    assert_eq!(g.parents_of(c.as_str()).mother, Some(&m));
    assert!(g.link_of(solo.as_str()).is_none());
    assert_parentage_invariants(&g);
}

#[test]
fn removing_a_child_drops_its_own_link() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let c = person(&mut g, Sex::U);
    link(&mut g, &c, Some(&f), None);

    g.remove_individual(c.as_str(), RemoveMode::STRICT).unwrap();
    assert_eq!(g.links().count(), 0);
    assert!(g.children_of(f.as_str()).is_empty());
}

#[test]
fn edge_count_counts_unions_and_parent_references() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);
    let c = person(&mut g, Sex::U);
    g.add_partnership(&f, &m, PartnershipAttrs::default()).unwrap();
    link(&mut g, &c, Some(&f), Some(&m));
    assert_eq!(g.edge_count(), 3);
}

#[test]
fn pregnancies_reference_existing_parents() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);

    let p1 = g
        .upsert_pregnancy(
            Pregnancy::new(Some(m.clone()), Some(f.clone())).with_outcome(PregnancyOutcome::SAB),
        )
        .unwrap();
    assert_eq!(p1.as_str(), "P1");
    assert_eq!(g.pregnancies_of(f.as_str()).count(), 1);

    let err = g
        .upsert_pregnancy(Pregnancy::new(Some("nobody".into()), None))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::DanglingReference);
    let err = g
        .upsert_pregnancy(Pregnancy::new(Some(m.clone()), Some(m.clone())))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::DuplicateParent);

    let mut edited = g.pregnancy(p1.as_str()).unwrap().clone();
    edited.gestational_age_wks = Some(9);
    assert_eq!(g.upsert_pregnancy(edited).unwrap(), p1);
    assert_eq!(g.pregnancies().count(), 1);
    assert_eq!(g.pregnancy(p1.as_str()).unwrap().gestational_age_wks, Some(9));
}

#[test]
fn removing_a_pregnancy_drops_its_art_records() {
    let mut g = PedigreeGraph::new();
    let m = person(&mut g, Sex::F);
    let p = g.upsert_pregnancy(Pregnancy::new(Some(m), None)).unwrap();
    let donor = g
        .upsert_art(ArtRecord::new(ArtRole::D, Some(p.clone())))
        .unwrap();
    let loose = g.upsert_art(ArtRecord::new(ArtRole::S, None)).unwrap();
    assert_eq!(donor.as_str(), "ART1");

    let err = g
        .upsert_art(ArtRecord::new(ArtRole::D, Some("P9".into())))
        .unwrap_err();
    assert_eq!(err.kind(), StructuralErrorKind::DanglingReference);

    g.remove_pregnancy(p.as_str()).unwrap();
    assert!(g.art_record(donor.as_str()).is_none());
    assert!(g.art_record(loose.as_str()).is_some());
}

#[test]
fn pregnancy_parents_are_not_silently_removed() {
    let mut g = PedigreeGraph::new();
    let f = person(&mut g, Sex::M);
    let m = person(&mut g, Sex::F);
    let p = g
        .upsert_pregnancy(Pregnancy::new(Some(m.clone()), Some(f.clone())))
        .unwrap();
    let art = g.upsert_art(ArtRecord::new(ArtRole::S, Some(p.clone()))).unwrap();

    let err = g
        .remove_individual(m.as_str(), RemoveMode::STRICT)
        .unwrap_err();
    assert_eq!(
        err,
        StructuralError::NotRemovable {
            id: m.clone(),
            partnerships: 0,
            children: 0,
            pregnancies: 1,
        }
    );

    g.remove_individual(m.as_str(), RemoveMode::CASCADE).unwrap();
    assert!(g.pregnancy(p.as_str()).is_none());
    assert!(g.art_record(art.as_str()).is_none());
    assert!(g.contains(f.as_str()));
}
