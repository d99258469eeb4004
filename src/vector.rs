use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub trait VectorValue: Sized + Copy + Default {}
impl<T> VectorValue for T where T: Sized + Copy + Default {}

/// Fixed-size numeric vector. Board code only ever uses the 2D aliases.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub struct Vector<const SIZE: usize, T: VectorValue>(pub [T; SIZE]);

/// Cell position or offset on a board. Y grows downward.
pub type Vec2i = Vector<2, i32>;
/// Index into board storage.
pub type Vec2u = Vector<2, u32>;

impl<const SIZE: usize, T: VectorValue> Vector<SIZE, T> {
    pub fn map<O: VectorValue>(self, f: impl Fn(T) -> O) -> Vector<SIZE, O> {
        Vector(std::array::from_fn(|i| f(self.0[i])))
    }

    pub fn combine_with<I: VectorValue, O: VectorValue>(
        &self,
        other: Vector<SIZE, I>,
        f: impl Fn(T, I) -> O,
    ) -> Vector<SIZE, O> {
        Vector(std::array::from_fn(|i| f(self.0[i], other.0[i])))
    }
}

impl<T: VectorValue> Vector<2, T> {
    pub const fn new(x: T, y: T) -> Self {
        Self([x, y])
    }
}

macro_rules! impl_vec_component {
    ($name:ident, $index:literal) => {
        impl<T: VectorValue> Vector<2, T> {
            #[inline]
            pub fn $name(&self) -> T {
                self.0[$index]
            }

            paste::paste! {
                #[inline]
                pub fn [< with_ $name >](mut self, v: T) -> Self {
                    self.0[$index] = v;
                    self
                }
            }
        }
    };
}

impl_vec_component!(x, 0);
impl_vec_component!(y, 1);

impl Vec2i {
    /// Componentwise signum, used for single grid steps towards a target.
    pub fn signum(&self) -> Self {
        self.map(i32::signum)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0]
    }

    /// Position as unsigned grid indices, `None` when any component is negative.
    pub fn to_index(self) -> Option<Vec2u> {
        Some(Vec2u::new(
            u32::try_from(self.x()).ok()?,
            u32::try_from(self.y()).ok()?,
        ))
    }
}

impl<const SIZE: usize, T: VectorValue> Default for Vector<SIZE, T> {
    fn default() -> Self {
        Self([T::default(); SIZE])
    }
}

impl<const SIZE: usize, T: VectorValue + Display> Display for Vector<SIZE, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            value.fmt(f)?;
        }
        f.write_str(")")
    }
}

macro_rules! impl_op {
    ($trait:ident, $fn:ident, $op:tt) => {
        impl<const SIZE: usize, T, R> std::ops::$trait<R> for Vector<SIZE, T>
        where
            T: VectorValue + std::ops::$trait<Output = T>,
            R: Into<Vector<SIZE, T>>,
        {
            type Output = Self;

            fn $fn(self, rhs: R) -> Self {
                self.combine_with(rhs.into(), |a, b| a $op b)
            }
        }

        paste::paste! {
            impl<const SIZE: usize, T, R> std::ops::[<$trait Assign>]<R> for Vector<SIZE, T>
            where
                T: VectorValue + std::ops::$trait<Output = T>,
                R: Into<Vector<SIZE, T>>,
            {
                fn [<$fn _assign>](&mut self, rhs: R) {
                    *self = self.combine_with(rhs.into(), |a, b| a $op b);
                }
            }
        }
    };
}

impl_op!(Add, add, +);
impl_op!(Sub, sub, -);
impl_op!(Mul, mul, *);

impl<const SIZE: usize, T: VectorValue + std::ops::Neg<Output = T>> std::ops::Neg
    for Vector<SIZE, T>
{
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

/// Scalars broadcast to every component.
impl<const SIZE: usize, T: VectorValue> From<T> for Vector<SIZE, T> {
    fn from(value: T) -> Self {
        Self([value; SIZE])
    }
}

impl<const SIZE: usize, T: VectorValue> From<[T; SIZE]> for Vector<SIZE, T> {
    fn from(value: [T; SIZE]) -> Self {
        Self(value)
    }
}

impl Serialize for Vec2i {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.x(), self.y()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vec2i {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (x, y) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(Self::new(x, y))
    }
}
