use physbox_macro_tools::{Builder, Deref, Fields};

#[test]
fn test_read_fields() {
    #[derive(Fields)]
    #[r]
    struct Material {
        name: String,
        friction: f32,
    }

    let material = Material {
        name: "rubber".to_owned(),
        friction: 0.8,
    };

    let name: &String = material.name();
    let friction: f32 = material.friction();

    assert_eq!(name, "rubber");
    assert_eq!(friction, 0.8);
}

#[test]
fn test_write_fields() {
    #[derive(Fields)]
    #[w]
    struct Material {
        name: String,
        friction: f32,
    }

    let mut material = Material {
        name: String::new(),
        friction: 0.1,
    };

    material.name_mut().push_str("ice");
    *material.friction_mut() = 0.02;

    assert_eq!(material.name, "ice");
    assert_eq!(material.friction, 0.02);
}

#[test]
fn test_field_level_setters() {
    #[derive(Fields)]
    #[r]
    struct Belt {
        #[w(set)]
        speed: f32,
        #[w(reducer)]
        label: String,
        #[r(skip)]
        #[allow(dead_code)]
        hidden: u8,
    }

    let mut belt = Belt {
        speed: 0.,
        label: "belt".to_owned(),
        hidden: 0,
    };

    belt.set_speed(120.).set_label(|label| label + "-1");

    assert_eq!(belt.speed(), 120.);
    assert_eq!(belt.label(), "belt-1");
}

#[test]
fn test_copy_reader() {
    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Pair(i32, i32);

    #[derive(Fields)]
    struct Holder {
        #[r(copy)]
        pair: Pair,
    }

    let holder = Holder { pair: Pair(1, 2) };
    let pair: Pair = holder.pair();
    assert_eq!(pair, Pair(1, 2));
}

mod private {
    use physbox_macro_tools::Fields;

    #[derive(Fields)]
    #[r]
    pub struct Counter {
        #[w(set, vis(pub(crate)))]
        count: u32,
    }

    impl Counter {
        pub fn new() -> Self {
            Counter { count: 0 }
        }
    }
}

#[test]
fn test_write_visibility() {
    let mut counter = private::Counter::new();
    counter.set_count(3);
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_builder_defaults_and_setters() {
    #[derive(Builder, Debug)]
    struct Settings {
        #[default = 10]
        iterations: u32,
        #[default = 0.5]
        damping: f32,
        #[builder(skip)]
        #[default = true]
        locked: bool,
        name: String,
    }

    let settings = Settings::default();
    assert_eq!(settings.iterations, 10);
    assert_eq!(settings.damping, 0.5);
    assert!(settings.locked);
    assert!(settings.name.is_empty());

    let settings: Settings = SettingsBuilder::new().iterations(4).name("fast".to_owned()).into();
    assert_eq!(settings.iterations, 4);
    assert_eq!(settings.damping, 0.5);
    assert_eq!(settings.name, "fast");

    let settings = SettingsBuilder::new().damping(0.9).build();
    assert_eq!(settings.damping, 0.9);
}

#[test]
fn test_deref() {
    #[derive(Deref)]
    struct Wrapper {
        #[deref]
        inner: Vec<u8>,
        #[allow(dead_code)]
        tag: u8,
    }

    let mut wrapper = Wrapper {
        inner: vec![1, 2],
        tag: 0,
    };

    wrapper.push(3);
    assert_eq!(wrapper.len(), 3);
}
