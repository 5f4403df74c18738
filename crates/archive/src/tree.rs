use jarview_class_file::ClassFile;

/// Index of a node inside its [`PackageTree`] arena. The parent link is the
/// same kind of index, so the tree has a single ownership edge per node and
/// no cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackageId(usize);

/// A decoded class attached to a package. `name` is the file stem, without
/// the `.class` suffix.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub class_file: ClassFile,
}

/// An uninterpreted archive entry: file stem, extension, raw content read
/// eagerly and immutable afterwards.
#[derive(Debug, PartialEq)]
pub struct Resource {
    pub name: String,
    pub extension: String,
    pub content: Vec<u8>,
}

#[derive(Debug)]
pub struct PackageNode {
    name: String,
    parent: Option<PackageId>,
    subpackages: Vec<PackageId>,
    classes: Vec<Class>,
    resources: Vec<Resource>,
}
impl PackageNode {
    fn new(name: String, parent: Option<PackageId>) -> Self {
        Self {
            name,
            parent,
            subpackages: Vec::new(),
            classes: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<PackageId> {
        self.parent
    }

    /// Direct sub-packages, in insertion order.
    pub fn subpackages(&self) -> &[PackageId] {
        &self.subpackages
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }
}

/// Arena of package nodes. Node 0 is the archive root, a parentless package
/// named after the archive itself.
///
/// All three traversals ([`classes`](Self::classes),
/// [`resources`](Self::resources), [`packages`](Self::packages)) are lazy,
/// depth-first and restartable, with one fixed order: pre-order, a node's
/// own items before its sub-packages (for `packages`, the node itself comes
/// first), and sub-packages in insertion order. Iterating an unmutated tree
/// twice yields identical sequences.
#[derive(Debug)]
pub struct PackageTree {
    nodes: Vec<PackageNode>,
}
impl PackageTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![PackageNode::new(root_name.into(), None)],
        }
    }

    pub fn root(&self) -> PackageId {
        PackageId(0)
    }

    pub fn node(&self, id: PackageId) -> &PackageNode {
        &self.nodes[id.0]
    }

    /// Exact, case-sensitive lookup among the direct sub-packages of `id`.
    pub fn subpackage(&self, id: PackageId, name: &str) -> Option<PackageId> {
        self.nodes[id.0]
            .subpackages
            .iter()
            .copied()
            .find(|&child| self.nodes[child.0].name == name)
    }

    /// Create-or-reuse: asking twice for the same name under the same
    /// parent returns the same node.
    pub fn ensure_package(&mut self, parent: PackageId, name: &str) -> PackageId {
        if let Some(existing) = self.subpackage(parent, name) {
            return existing;
        }

        let id = PackageId(self.nodes.len());
        self.nodes.push(PackageNode::new(name.to_owned(), Some(parent)));
        self.nodes[parent.0].subpackages.push(id);
        id
    }

    /// Walks `segments` down from the root, creating packages only where
    /// none exist yet.
    pub fn ensure_path<'a>(&mut self, segments: impl IntoIterator<Item = &'a str>) -> PackageId {
        segments
            .into_iter()
            .fold(self.root(), |package, name| {
                self.ensure_package(package, name)
            })
    }

    pub fn add_class(&mut self, id: PackageId, class: Class) {
        self.nodes[id.0].classes.push(class);
    }

    pub fn add_resource(&mut self, id: PackageId, resource: Resource) {
        self.nodes[id.0].resources.push(resource);
    }

    /// Dotted package path rebuilt through the parent links. The archive
    /// root's name is not part of it; the root itself maps to `""`.
    pub fn qualified_name(&self, id: PackageId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let node = &self.nodes[c.0];
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            current = node.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn classes(&self, from: PackageId) -> Classes<'_> {
        let node = &self.nodes[from.0];
        Classes {
            tree: self,
            stack: node.subpackages.iter().rev().copied().collect(),
            current: node.classes.iter(),
        }
    }

    pub fn resources(&self, from: PackageId) -> Resources<'_> {
        let node = &self.nodes[from.0];
        Resources {
            tree: self,
            stack: node.subpackages.iter().rev().copied().collect(),
            current: node.resources.iter(),
        }
    }

    pub fn packages(&self, from: PackageId) -> Packages<'_> {
        Packages {
            tree: self,
            stack: vec![from],
        }
    }
}

pub struct Classes<'a> {
    tree: &'a PackageTree,
    stack: Vec<PackageId>,
    current: std::slice::Iter<'a, Class>,
}
impl<'a> Iterator for Classes<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(class) = self.current.next() {
                return Some(class);
            }
            let id = self.stack.pop()?;
            let node = &self.tree.nodes[id.0];
            self.stack.extend(node.subpackages.iter().rev());
            self.current = node.classes.iter();
        }
    }
}

pub struct Resources<'a> {
    tree: &'a PackageTree,
    stack: Vec<PackageId>,
    current: std::slice::Iter<'a, Resource>,
}
impl<'a> Iterator for Resources<'a> {
    type Item = &'a Resource;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(resource) = self.current.next() {
                return Some(resource);
            }
            let id = self.stack.pop()?;
            let node = &self.tree.nodes[id.0];
            self.stack.extend(node.subpackages.iter().rev());
            self.current = node.resources.iter();
        }
    }
}

pub struct Packages<'a> {
    tree: &'a PackageTree,
    stack: Vec<PackageId>,
}
impl Iterator for Packages<'_> {
    type Item = PackageId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].subpackages.iter().rev());
        Some(id)
    }
}

#[cfg(test)]
mod tree_tests {
    use super::*;

    #[test]
    fn ensure_package_is_idempotent() {
        let mut tree = PackageTree::new("test.jar");
        let root = tree.root();

        let a = tree.ensure_package(root, "a");
        let b = tree.ensure_package(a, "b");
        assert_eq!(a, tree.ensure_package(root, "a"));
        assert_eq!(b, tree.ensure_package(a, "b"));
        assert_eq!(1, tree.node(root).subpackages().len());
        assert_eq!(1, tree.node(a).subpackages().len());
    }

    #[test]
    fn subpackage_lookup_is_case_sensitive() {
        let mut tree = PackageTree::new("test.jar");
        let root = tree.root();
        tree.ensure_package(root, "a");

        assert!(tree.subpackage(root, "a").is_some());
        assert!(tree.subpackage(root, "A").is_none());
    }

    #[test]
    fn packages_are_yielded_self_first_in_insertion_order() {
        let mut tree = PackageTree::new("test.jar");
        let root = tree.root();
        let a = tree.ensure_package(root, "a");
        let b = tree.ensure_package(root, "b");
        let a_inner = tree.ensure_package(a, "inner");

        let order = tree.packages(root).collect::<Vec<_>>();
        assert_eq!(vec![root, a, a_inner, b], order);
    }

    #[test]
    fn qualified_name_skips_the_root() {
        let mut tree = PackageTree::new("test.jar");
        let root = tree.root();
        let a = tree.ensure_package(root, "a");
        let b = tree.ensure_package(a, "b");

        assert_eq!("", tree.qualified_name(root));
        assert_eq!("a.b", tree.qualified_name(b));
    }

    #[test]
    fn resources_traverse_depth_first() {
        let mut tree = PackageTree::new("test.jar");
        let root = tree.root();
        let a = tree.ensure_package(root, "a");
        let resource = |name: &str| Resource {
            name: name.to_owned(),
            extension: "txt".to_owned(),
            content: Vec::new(),
        };
        tree.add_resource(root, resource("top"));
        tree.add_resource(a, resource("nested"));

        let names = tree
            .resources(root)
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vec!["top", "nested"], names);
    }
}
