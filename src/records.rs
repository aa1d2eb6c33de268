//! Runtime record types: the factory and the instance protocol.

use std::{
    fmt,
    hash::{Hash, Hasher},
    ops,
    sync::Arc,
};

use indexmap::{IndexMap, IndexSet};

use crate::{
    conditions::Condition,
    num::Number,
    symbols::Symbol,
    value::{Map, Value},
};

pub type NativeFn = Arc<dyn Fn(&mut Record, &[Value]) -> Result<Value, Condition> + Send + Sync>;

/// A named operation in a record type's operation table, with its declared
/// arity. Dispatch checks the arity before the function runs.
#[derive(Clone, derive_more::Debug)]
pub struct Method {
    num_args: usize,
    variadic: bool,
    #[debug(skip)]
    func: NativeFn,
}

impl Method {
    pub fn new(
        num_args: usize,
        func: impl Fn(&mut Record, &[Value]) -> Result<Value, Condition> + Send + Sync + 'static,
    ) -> Self {
        Self {
            num_args,
            variadic: false,
            func: Arc::new(func),
        }
    }

    /// A method accepting `num_args` or more arguments.
    pub fn variadic(
        num_args: usize,
        func: impl Fn(&mut Record, &[Value]) -> Result<Value, Condition> + Send + Sync + 'static,
    ) -> Self {
        Self {
            num_args,
            variadic: true,
            func: Arc::new(func),
        }
    }

    fn invoke(&self, record: &mut Record, args: &[Value]) -> Result<Value, Condition> {
        if self.variadic {
            if args.len() < self.num_args {
                return Err(Condition::wrong_num_of_var_args(self.num_args, args.len()));
            }
        } else if args.len() != self.num_args {
            return Err(Condition::wrong_num_of_args(self.num_args, args.len()));
        }
        (self.func)(record, args)
    }
}

/// Addresses a field by schema position or by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKey {
    Index(usize),
    Name(Symbol),
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Symbol> for FieldKey {
    fn from(name: Symbol) -> Self {
        Self::Name(name)
    }
}

impl From<&'_ str> for FieldKey {
    fn from(name: &str) -> Self {
        Self::Name(Symbol::intern(name))
    }
}

impl TryFrom<&'_ Value> for FieldKey {
    type Error = Condition;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Symbol(sym) => Ok(Self::Name(*sym)),
            Value::String(s) => Ok(Self::Name(Symbol::intern(s))),
            Value::Number(n) => Ok(Self::Index(n.to_index()?)),
            other => Err(Condition::type_error("field key", other.type_name())),
        }
    }
}

/// Type declaration for a record: the frozen field schema plus the operation
/// table, created once per factory invocation and never mutated afterwards.
///
/// Type identity is `Arc` pointer identity. Two invocations of the factory
/// with identical field lists still produce distinct types, and instances of
/// distinct types never compare equal.
#[derive(derive_more::Debug)]
pub struct RecordType {
    name: Option<Symbol>,
    fields: IndexSet<Symbol>,
    #[debug(skip)]
    methods: IndexMap<Symbol, Method>,
    constants: IndexMap<Symbol, Value>,
}

impl RecordType {
    pub fn builder() -> RecordTypeBuilder {
        RecordTypeBuilder::new()
    }

    /// Shorthand for a type with the given fields and no extensions.
    pub fn define<I>(fields: I) -> Result<Arc<Self>, Condition>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        Self::builder().fields(fields).build()
    }

    pub fn name(&self) -> Option<Symbol> {
        self.name
    }

    /// Field count of the schema.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The ordered field names.
    pub fn members(&self) -> impl ExactSizeIterator<Item = Symbol> + '_ {
        self.fields.iter().copied()
    }

    /// Looks up a constant attached by the extension at build time.
    pub fn constant(&self, name: impl Into<Symbol>) -> Option<&Value> {
        self.constants.get(&name.into())
    }

    /// Resolves a field key to its schema position.
    pub fn resolve(&self, key: impl Into<FieldKey>) -> Result<usize, Condition> {
        match key.into() {
            FieldKey::Index(index) if index < self.fields.len() => Ok(index),
            FieldKey::Index(index) => Err(Condition::invalid_index(index, self.fields.len())),
            FieldKey::Name(name) => self
                .fields
                .get_index_of(&name)
                .ok_or(Condition::UnknownField(name)),
        }
    }

    /// Runs the generated constructor: exactly one value per field, assigned
    /// in schema order. Any other count fails before an instance exists.
    pub fn instantiate(self: &Arc<Self>, values: impl Into<Vec<Value>>) -> Result<Record, Condition> {
        let fields = values.into();
        if fields.len() != self.fields.len() {
            return Err(Condition::wrong_num_of_args(self.fields.len(), fields.len()));
        }
        Ok(Record {
            record_type: self.clone(),
            fields,
        })
    }

    /// Keyword form of the constructor: `(name, value)` pairs in any order.
    /// Every schema field must appear exactly once.
    pub fn instantiate_named(
        self: &Arc<Self>,
        pairs: impl IntoIterator<Item = (Symbol, Value)>,
    ) -> Result<Record, Condition> {
        let mut fields = vec![Value::Nil; self.fields.len()];
        let mut seen = vec![false; self.fields.len()];
        let mut provided = 0;
        for (name, value) in pairs {
            let index = self.resolve(name)?;
            if seen[index] {
                return Err(Condition::DuplicateField(name));
            }
            seen[index] = true;
            fields[index] = value;
            provided += 1;
        }
        if provided != self.fields.len() {
            return Err(Condition::wrong_num_of_args(self.fields.len(), provided));
        }
        Ok(Record {
            record_type: self.clone(),
            fields,
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "#<record-type {name}")?,
            None => write!(f, "#<record-type")?,
        }
        for field in &self.fields {
            write!(f, " {field}")?;
        }
        write!(f, ">")
    }
}

/// An instance of a runtime-defined record type: one value per schema field,
/// stored positionally.
#[derive(Clone, Debug)]
pub struct Record {
    record_type: Arc<RecordType>,
    fields: Vec<Value>,
}

impl Record {
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn get(&self, key: impl Into<FieldKey>) -> Result<&Value, Condition> {
        let index = self.record_type.resolve(key)?;
        Ok(&self.fields[index])
    }

    pub fn get_mut(&mut self, key: impl Into<FieldKey>) -> Result<&mut Value, Condition> {
        let index = self.record_type.resolve(key)?;
        Ok(&mut self.fields[index])
    }

    pub fn set(&mut self, key: impl Into<FieldKey>, value: impl Into<Value>) -> Result<(), Condition> {
        *self.get_mut(key)? = value.into();
        Ok(())
    }

    /// Field count (schema length), regardless of how many fields are nil.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The ordered field names.
    pub fn members(&self) -> impl ExactSizeIterator<Item = Symbol> + '_ {
        self.record_type.members()
    }

    /// The field values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.fields
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.fields.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.fields.iter()
    }

    /// Applies `f` to each field value in schema order.
    pub fn each(&self, f: impl FnMut(&Value)) {
        self.fields.iter().for_each(f);
    }

    /// Applies `f` to each `(name, value)` pair in schema order.
    pub fn each_pair(&self, mut f: impl FnMut(Symbol, &Value)) {
        for (name, value) in self.members().zip(&self.fields) {
            f(name, value);
        }
    }

    /// The field values satisfying `pred`, in schema order.
    pub fn select(&self, mut pred: impl FnMut(&Value) -> bool) -> Vec<Value> {
        self.fields
            .iter()
            .filter(|&value| pred(value))
            .cloned()
            .collect()
    }

    /// The values at the given schema positions, in the order the positions
    /// were supplied. Duplicates are preserved.
    pub fn values_at(&self, indices: &[usize]) -> Result<Vec<Value>, Condition> {
        indices
            .iter()
            .map(|&index| {
                self.fields
                    .get(index)
                    .cloned()
                    .ok_or_else(|| Condition::invalid_index(index, self.fields.len()))
            })
            .collect()
    }

    /// Mapping from field name to value, in schema order.
    pub fn to_h(&self) -> IndexMap<Symbol, Value> {
        self.members().zip(self.fields.iter().cloned()).collect()
    }

    /// Walks a nested access path: the first element addresses a field on
    /// this record, each later element re-applies keyed access to the prior
    /// result. Returns `None` as soon as a link is absent.
    pub fn dig(&self, path: &[Value]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.lookup(first)?;
        for key in rest {
            current = current.index(key)?;
        }
        Some(current)
    }

    /// Keyed access without the error reporting of [`Record::get`]; the
    /// traversal step behind `dig`.
    pub(crate) fn lookup(&self, key: &Value) -> Option<&Value> {
        let key = FieldKey::try_from(key).ok()?;
        let index = self.record_type.resolve(key).ok()?;
        self.fields.get(index)
    }

    /// Invokes a named operation from the type's operation table: the
    /// generated protocol entries plus whatever the extension merged in.
    pub fn call(&mut self, name: impl Into<Symbol>, args: &[Value]) -> Result<Value, Condition> {
        let name = name.into();
        let method = self
            .record_type
            .methods
            .get(&name)
            .cloned()
            .ok_or(Condition::UnknownMethod(name))?;
        method.invoke(self, args)
    }
}

// Records are equal iff they share the exact same generated type and their
// value sequences are equal element-wise.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record_type, &other.record_type) && self.fields == other.fields
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.record_type).hash(state);
        self.fields.hash(state);
    }
}

impl<K: Into<FieldKey>> ops::Index<K> for Record {
    type Output = Value;

    /// Panics on an unknown field; [`Record::get`] is the fallible form.
    fn index(&self, key: K) -> &Value {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K: Into<FieldKey>> ops::IndexMut<K> for Record {
    fn index_mut(&mut self, key: K) -> &mut Value {
        match self.get_mut(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_type.name {
            Some(name) => write!(f, "#<{name}")?,
            None => write!(f, "#<record")?,
        }
        let mut pairs = self.members().zip(&self.fields).peekable();
        if pairs.peek().is_some() {
            write!(f, " ")?;
        }
        while let Some((name, value)) = pairs.next() {
            write!(f, "{name}: {value}")?;
            if pairs.peek().is_some() {
                write!(f, ", ")?;
            }
        }
        write!(f, ">")
    }
}

/// The factory entry point: collects a field schema and optional extensions,
/// then freezes them into a [`RecordType`].
#[derive(Default)]
pub struct RecordTypeBuilder {
    name: Option<Symbol>,
    fields: IndexSet<Symbol>,
    duplicate: Option<Symbol>,
    methods: IndexMap<Symbol, Method>,
    constants: IndexMap<Symbol, Value>,
}

impl RecordTypeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the type. Naming alone binds nothing; registration in a
    /// namespace is a separate step (see [`crate::registry`]).
    pub fn named(mut self, name: impl Into<Symbol>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<Symbol>) -> Self {
        let name = name.into();
        if !self.fields.insert(name) && self.duplicate.is_none() {
            self.duplicate = Some(name);
        }
        self
    }

    pub fn fields<I>(self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        names.into_iter().fold(self, Self::field)
    }

    /// Attaches a named operation, overriding a generated one of the same
    /// name.
    pub fn method(mut self, name: impl Into<Symbol>, method: Method) -> Self {
        self.methods.insert(name.into(), method);
        self
    }

    /// Attaches a named constant, resolvable through [`RecordType::constant`].
    pub fn constant(mut self, name: impl Into<Symbol>, value: impl Into<Value>) -> Self {
        self.constants.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Arc<RecordType>, Condition> {
        if let Some(duplicate) = self.duplicate {
            return Err(Condition::DuplicateField(duplicate));
        }
        let mut methods = generated_operations();
        methods.extend(self.methods);
        Ok(Arc::new(RecordType {
            name: self.name,
            fields: self.fields,
            methods,
            constants: self.constants,
        }))
    }
}

/// The operation table every generated type starts from. Extension methods
/// merge over these entries, so a same-named extension wins.
fn generated_operations() -> IndexMap<Symbol, Method> {
    let mut ops = IndexMap::new();

    let length = Method::new(0, |record: &mut Record, _: &[Value]| {
        Ok(Value::from(record.len() as i64))
    });
    ops.insert(Symbol::intern("length"), length.clone());
    ops.insert(Symbol::intern("size"), length);

    let to_a = Method::new(0, |record: &mut Record, _: &[Value]| {
        Ok(Value::Vector(record.to_vec()))
    });
    ops.insert(Symbol::intern("to_a"), to_a.clone());
    ops.insert(Symbol::intern("values"), to_a);

    ops.insert(
        Symbol::intern("members"),
        Method::new(0, |record: &mut Record, _: &[Value]| {
            Ok(Value::Vector(record.members().map(Value::Symbol).collect()))
        }),
    );

    ops.insert(
        Symbol::intern("to_h"),
        Method::new(0, |record: &mut Record, _: &[Value]| {
            Ok(Value::Map(
                record
                    .members()
                    .map(Value::Symbol)
                    .zip(record.iter().cloned())
                    .collect::<Map>(),
            ))
        }),
    );

    ops.insert(
        Symbol::intern("get"),
        Method::new(1, |record: &mut Record, args: &[Value]| {
            Ok(record.get(FieldKey::try_from(&args[0])?)?.clone())
        }),
    );

    ops.insert(
        Symbol::intern("set"),
        Method::new(2, |record: &mut Record, args: &[Value]| {
            record.set(FieldKey::try_from(&args[0])?, args[1].clone())?;
            Ok(Value::Nil)
        }),
    );

    ops.insert(
        Symbol::intern("values_at"),
        Method::variadic(0, |record: &mut Record, args: &[Value]| {
            let indices = args
                .iter()
                .map(|arg| <&Number>::try_from(arg)?.to_index())
                .collect::<Result<Vec<_>, Condition>>()?;
            Ok(Value::Vector(record.values_at(&indices)?))
        }),
    );

    ops.insert(
        Symbol::intern("dig"),
        Method::variadic(1, |record: &mut Record, args: &[Value]| {
            Ok(record.dig(args).cloned().unwrap_or(Value::Nil))
        }),
    );

    ops.insert(
        Symbol::intern("eq"),
        Method::new(1, |record: &mut Record, args: &[Value]| {
            Ok(Value::Boolean(match &args[0] {
                Value::Record(other) => *record == **other,
                _ => false,
            }))
        }),
    );

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_rejected() {
        let err = RecordType::define(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, Condition::DuplicateField(Symbol::intern("a")));
    }

    #[test]
    fn test_zero_field_type_is_degenerate_but_valid() {
        let ty = RecordType::define::<[&str; 0]>([]).unwrap();
        let record = ty.instantiate(vec![]).unwrap();
        assert_eq!(record.len(), 0);
        assert!(record.values().is_empty());
        assert!(ty.instantiate(vec![Value::Nil]).is_err());
    }

    #[test]
    fn test_dispatch_checks_method_arity() {
        let ty = RecordType::define(["a"]).unwrap();
        let mut record = ty.instantiate(vec![Value::from(1)]).unwrap();
        assert_eq!(
            record.call("length", &[Value::Nil]),
            Err(Condition::wrong_num_of_args(0, 1))
        );
        assert_eq!(
            record.call("dig", &[]),
            Err(Condition::wrong_num_of_var_args(1, 0))
        );
    }

    #[test]
    fn test_extension_overrides_generated_operation() {
        let ty = RecordType::builder()
            .fields(["a", "b"])
            .method(
                "length",
                Method::new(0, |_: &mut Record, _: &[Value]| Ok(Value::from(99))),
            )
            .build()
            .unwrap();
        let mut record = ty
            .instantiate(vec![Value::from(1), Value::from(2)])
            .unwrap();
        assert_eq!(record.call("length", &[]), Ok(Value::from(99)));
        // The inherent primitive is untouched.
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_index_sugar() {
        let ty = RecordType::define(["a"]).unwrap();
        let mut record = ty.instantiate(vec![Value::from(1)]).unwrap();
        assert_eq!(record["a"], Value::from(1));
        record[0usize] = Value::from(2);
        assert_eq!(record["a"], Value::from(2));
    }

    #[test]
    #[should_panic(expected = "no field named")]
    fn test_index_sugar_panics_on_unknown_field() {
        let ty = RecordType::define(["a"]).unwrap();
        let record = ty.instantiate(vec![Value::from(1)]).unwrap();
        let _ = &record["missing"];
    }
}
