use std::collections::HashMap;

use reader::ClassFile;

/// The process-wide map from internal class name to parsed class (spec
/// §GLOSSARY). The simplified interpreter only ever loads the single class
/// named on the command line; there is no classpath search and no eager
/// resolution of superclasses or interfaces (spec §1 Non-goals), so this is
/// little more than a named store the interpreter retires a class into once
/// it has finished running it.
#[derive(Debug, Default)]
pub struct MethodArea {
    classes: HashMap<String, ClassFile>,
}

impl MethodArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, class: ClassFile) {
        let name = class.class_name().into_owned();
        self.classes.insert(name, class);
    }

    pub fn get(&self, name: &str) -> Option<&ClassFile> {
        self.classes.get(name)
    }
}
