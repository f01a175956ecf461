use super::model::ClassNames;

/// Resolves class indices to labels.
///
/// Lookup order: the operator-supplied override table, then the names embedded
/// in the model, then a synthesized `class_<index>` placeholder.
#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    overrides: Option<ClassNames>,
    model_names: ClassNames,
}

impl LabelResolver {
    pub fn new(overrides: Option<ClassNames>, model_names: ClassNames) -> Self {
        Self { overrides, model_names }
    }

    pub fn resolve(&self, class_id: usize) -> String {
        self.overrides
            .as_ref()
            .and_then(|o| o.get(&class_id))
            .or_else(|| self.model_names.get(&class_id))
            .cloned()
            .unwrap_or_else(|| placeholder_label(class_id))
    }
}

pub fn placeholder_label(class_id: usize) -> String {
    format!("class_{class_id}")
}
