use physbox_engine::prelude::*;
use rand::Rng;

fn ground(scene: &mut Scene) -> ID {
    scene.push_element(ElementBuilder::new(
        Rect::new((0., 500.), 2000., 40.),
        MetaBuilder::new().is_fixed(true),
        (),
    ))
}

#[test]
fn random_pile_stays_finite_and_above_ground() {
    let mut rng = rand::thread_rng();
    let mut scene = Scene::new();
    ground(&mut scene);

    let ids: Vec<ID> = (0..20)
        .map(|i| {
            let x: f32 = rng.gen_range(-200. ..200.);
            let y = 400. - i as f32 * 45.;
            let element: Element<()> = if i % 2 == 0 {
                ElementBuilder::new(
                    Rect::new((x, y), rng.gen_range(20. ..40.), 20.),
                    MetaBuilder::new().mass(rng.gen_range(1. ..5.)),
                    (),
                )
                .into()
            } else {
                ElementBuilder::new(
                    Circle::new((x, y), rng.gen_range(8. ..15.)),
                    MetaBuilder::new(),
                    (),
                )
                .into()
            };
            scene.push_element(element)
        })
        .collect();

    for _ in 0..300 {
        scene.tick(1. / 60.);
    }

    for id in ids {
        let element = scene.get_element(id).unwrap();
        let center = element.center_point();
        assert!(center.is_finite());
        // ground top is at 480
        assert!(center.y() < 480.);
    }
}

#[test]
fn heavy_body_does_not_sink_through_light_ground_contact() {
    let mut scene = Scene::new();
    ground(&mut scene);
    let id = scene.push_element(ElementBuilder::new(
        RegularPolygon::new((0., 440.), 6, 20.),
        MetaBuilder::new().mass(100.),
        (),
    ));

    for _ in 0..180 {
        scene.tick(1. / 60.);
    }

    let element = scene.get_element(id).unwrap();
    assert!(element.aabb().1.y() < 481.);
    assert!(scene.is_element_collide(1, id));
}

#[test]
fn vectors_serialize_as_plain_numbers() {
    let vector = Vector::new(1.5, -2.);
    let json = serde_json::to_string(&vector).unwrap();
    assert_eq!(json, r#"{"x":1.5,"y":-2.0}"#);

    let point: Point = serde_json::from_str(r#"{"x":3.0,"y":4.0}"#).unwrap();
    assert_eq!(point, Point::new(3., 4.));
}
