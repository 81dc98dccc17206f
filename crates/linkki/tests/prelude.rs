//! The umbrella crate is enough to declare and bind a PMO.

use std::sync::Arc;

use linkki::prelude::*;
use linkki::{HeadlessComponent, ReadOnlyBehavior, BehaviorList};

#[derive(Debug, Clone, Copy, PartialEq, BindableEnum)]
enum Priority {
    Low,
    High,
}

struct TaskPmo {
    title: String,
    priority: Priority,
    done: u32,
}

#[bindable]
impl TaskPmo {
    #[ui_text_field(position = 1, label = "Title")]
    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    #[ui_combo_box(position = 2, available_values = EnumValuesExclNull)]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    #[ui_button(position = 3, label = "Done")]
    pub fn finish(&mut self) {
        self.done += 1;
    }
}

fn task() -> ObjectRef {
    ObjectRef::new(TaskPmo {
        title: "Write tests".into(),
        priority: Priority::Low,
        done: 0,
    })
}

#[test]
fn test_bind_through_prelude() {
    let pmo = task();
    let context = BindingContext::new("task", BindingConfig::default());
    let components = context.create_ui(&pmo).unwrap();
    assert_eq!(components.len(), 3);

    let values = components[1]
        .with(|c: &HeadlessComponent| c.available_values().len())
        .unwrap();
    assert_eq!(values, 2);

    components[1]
        .edit(Value::Enum(Priority::High.to_constant()))
        .unwrap();
    components[2].click().unwrap();
    assert_eq!(
        pmo.with(|t: &TaskPmo| (t.priority, t.done)),
        Some((Priority::High, 1))
    );
}

#[test]
fn test_read_only_config() {
    let pmo = task();
    let config = BindingConfig::default()
        .with_shared_behavior_provider(Arc::new(BehaviorList::new().with(ReadOnlyBehavior::new(true))));
    let context = BindingContext::new("task", config);
    let components = context.create_ui(&pmo).unwrap();

    components[0].edit(Value::from("Ignored")).unwrap();
    assert_eq!(
        pmo.with(|t: &TaskPmo| t.title.clone()).as_deref(),
        Some("Write tests")
    );
    // refreshing restores the model value
    context.update_ui().unwrap();
    assert_eq!(
        components[0].with(|c: &HeadlessComponent| c.value_ref().clone()),
        Some(Value::from("Write tests"))
    );
}
